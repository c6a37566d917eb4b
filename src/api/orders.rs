//! Order API handlers
//!
//! POST  /api/orders                — client creates an order (NEW)
//! GET   /api/orders                — client lists own orders
//! GET   /api/orders/available      — driver browses the open pool
//! GET   /api/orders/my             — driver lists held orders
//! GET   /api/orders/{id}           — either party, with status history
//! PATCH /api/orders/{id}           — client edits pre-assignment fields
//! POST  /api/orders/{id}/publish   — DRAFT -> PUBLISHED
//! POST  /api/orders/{id}/unpublish — PUBLISHED -> DRAFT
//! POST  /api/orders/{id}/take      — driver claims (compare-and-set)
//! POST  /api/orders/{id}/start     — TAKEN -> IN_PROGRESS
//! POST  /api/orders/{id}/status    — driver progress report
//! POST  /api/orders/{id}/complete  — client confirms completion
//! POST  /api/orders/{id}/cancel    — client cancels
//! POST  /api/orders/{id}/decline   — driver returns the order to the pool

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::Identity;
use crate::error::{AppResponse, AppResult, ok};
use crate::models::{
    AvailableQuery, CreateOrderRequest, OrderView, UpdateOrderRequest, UpdateStatusRequest,
};
use crate::orders::lifecycle::OrderStatus;
use crate::orders::service;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
}

/// Optional free-text comment carried by the action endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ActionBody {
    pub comment: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let view = service::create(&state, &identity, req).await?;
    Ok(ok(view))
}

pub async fn list_my(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<OrderView>>>> {
    let views = service::list_for_client(&state, &identity, query.status).await?;
    Ok(ok(views))
}

pub async fn list_available(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(filter): Query<AvailableQuery>,
) -> AppResult<Json<AppResponse<Vec<OrderView>>>> {
    let views = service::list_available(&state, &identity, &filter).await?;
    Ok(ok(views))
}

pub async fn list_assigned(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<AppResponse<Vec<OrderView>>>> {
    let views = service::list_mine(&state, &identity).await?;
    Ok(ok(views))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let view = service::get(&state, &identity, &id).await?;
    Ok(ok(view))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateOrderRequest>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let view = service::update(&state, &identity, &id, patch).await?;
    Ok(ok(view))
}

pub async fn publish(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let view = service::publish(&state, &identity, &id).await?;
    Ok(ok(view))
}

pub async fn unpublish(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let view = service::unpublish(&state, &identity, &id).await?;
    Ok(ok(view))
}

pub async fn take(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let view = service::take(&state, &identity, &id).await?;
    Ok(ok(view))
}

pub async fn start(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let view = service::start(&state, &identity, &id).await?;
    Ok(ok(view))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let view = service::update_status(&state, &identity, &id, req).await?;
    Ok(ok(view))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Option<Json<ActionBody>>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let comment = body.as_ref().and_then(|b| b.comment.as_deref());
    let view = service::complete(&state, &identity, &id, comment).await?;
    Ok(ok(view))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Option<Json<ActionBody>>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let comment = body.as_ref().and_then(|b| b.comment.as_deref());
    let view = service::cancel(&state, &identity, &id, comment).await?;
    Ok(ok(view))
}

pub async fn decline(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: Option<Json<ActionBody>>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let comment = body.as_ref().and_then(|b| b.comment.as_deref());
    let view = service::cancel_by_driver(&state, &identity, &id, comment).await?;
    Ok(ok(view))
}
