//! HTTP API
//!
//! Everything except the health probe sits behind the bearer middleware.

pub mod earnings;
pub mod health;
pub mod orders;
pub mod ratings;

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/orders", post(orders::create).get(orders::list_my))
        .route("/api/orders/available", get(orders::list_available))
        .route("/api/orders/my", get(orders::list_assigned))
        .route("/api/orders/{id}", get(orders::get).patch(orders::update))
        .route("/api/orders/{id}/publish", post(orders::publish))
        .route("/api/orders/{id}/unpublish", post(orders::unpublish))
        .route("/api/orders/{id}/take", post(orders::take))
        .route("/api/orders/{id}/start", post(orders::start))
        .route("/api/orders/{id}/status", post(orders::update_status))
        .route("/api/orders/{id}/complete", post(orders::complete))
        .route("/api/orders/{id}/cancel", post(orders::cancel))
        .route("/api/orders/{id}/decline", post(orders::decline))
        .route("/api/orders/{id}/ratings", post(ratings::create))
        .route("/api/drivers/{id}/ratings", get(ratings::for_driver))
        .route("/api/earnings", get(earnings::report))
        .route("/api/earnings/balance", get(earnings::balance))
        .route("/api/earnings/{id}/paid", post(earnings::mark_paid))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
