//! Rating API handlers
//!
//! POST /api/orders/{id}/ratings  — rate a completed order (either party)
//! GET  /api/drivers/{id}/ratings — a driver's received ratings

use axum::Extension;
use axum::Json;
use axum::extract::{Path, State};

use crate::auth::Identity;
use crate::error::{AppResponse, AppResult, ok};
use crate::models::{CreateRatingRequest, Rating, RatingSummary};
use crate::orders::service;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(req): Json<CreateRatingRequest>,
) -> AppResult<Json<AppResponse<Rating>>> {
    let rating = service::rate(&state, &identity, &id, req).await?;
    Ok(ok(rating))
}

pub async fn for_driver(
    State(state): State<AppState>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<RatingSummary>>> {
    let summary = service::ratings_for_driver(&state, &id).await?;
    Ok(ok(summary))
}
