//! Earnings API handlers
//!
//! GET  /api/earnings           — driver's CONFIRMED earnings report
//! GET  /api/earnings/balance   — driver's running balance
//! POST /api/earnings/{id}/paid — payout confirmation (back office)

use axum::Extension;
use axum::Json;
use axum::extract::{Path, Query, State};

use crate::auth::Identity;
use crate::earnings::{self, EarningsQuery};
use crate::error::{AppResponse, AppResult, ok};
use crate::models::{BalanceReport, DriverEarning, EarningsReport};
use crate::state::AppState;

pub async fn report(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<EarningsQuery>,
) -> AppResult<Json<AppResponse<EarningsReport>>> {
    let report = earnings::report(&state, &identity, &query).await?;
    Ok(ok(report))
}

pub async fn balance(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<AppResponse<BalanceReport>>> {
    let balance = earnings::balance(&state, &identity).await?;
    Ok(ok(balance))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<DriverEarning>>> {
    let earning = earnings::mark_paid(&state, &identity, &id).await?;
    Ok(ok(earning))
}
