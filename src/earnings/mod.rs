//! Driver earnings ledger
//!
//! The ledger is derived: rows are created only by the completion
//! transaction, one per order. This module only reports over it and flips
//! rows to PAID on payout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Identity;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{BalanceReport, DriverEarning, EarningOrder, EarningStatus, EarningsReport};
use crate::orders::guard;
use crate::state::AppState;

/// Query params for the earnings report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EarningsQuery {
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// CONFIRMED earnings of the calling driver over an optional date range
pub async fn report(
    state: &AppState,
    identity: &Identity,
    query: &EarningsQuery,
) -> AppResult<EarningsReport> {
    let driver_id = guard::require_driver(identity)?;

    let earnings =
        db::earnings::list_confirmed(&state.pool, driver_id, query.date_from, query.date_to)
            .await?;

    let total_amount = earnings.iter().map(|e| e.amount).sum();
    let currency = earnings
        .first()
        .map(|e| e.currency.clone())
        .unwrap_or_else(|| state.currency.clone());
    let orders = earnings
        .into_iter()
        .map(|e| EarningOrder {
            id: e.order_id,
            agreed_price: e.amount,
            completed_at: e.created_at,
        })
        .collect();

    Ok(EarningsReport {
        total_amount,
        currency,
        orders,
    })
}

/// Running balance of the calling driver: sum(CONFIRMED) - sum(PAID),
/// floored at zero
pub async fn balance(state: &AppState, identity: &Identity) -> AppResult<BalanceReport> {
    let driver_id = guard::require_driver(identity)?;

    let total_confirmed =
        db::earnings::sum_by_status(&state.pool, driver_id, EarningStatus::Confirmed).await?;
    let total_paid =
        db::earnings::sum_by_status(&state.pool, driver_id, EarningStatus::Paid).await?;

    let balance_to_pay = (total_confirmed - total_paid).max(Decimal::ZERO);

    Ok(BalanceReport {
        total_confirmed,
        total_paid,
        balance_to_pay,
        currency: state.currency.clone(),
    })
}

/// Flip one CONFIRMED earning to PAID (back-office payout confirmation)
pub async fn mark_paid(
    state: &AppState,
    identity: &Identity,
    earning_id: &str,
) -> AppResult<DriverEarning> {
    let earning = db::earnings::find(&state.pool, earning_id)
        .await?
        .ok_or_else(|| AppError::not_found("Earning not found"))?;

    if !db::earnings::mark_paid(&state.pool, earning_id).await? {
        return Err(AppError::precondition(format!(
            "Earning in {} cannot be marked paid",
            earning.status.as_str()
        )));
    }

    db::audit::record(
        &state.pool,
        &identity.user_id,
        "earning.mark_paid",
        "earning",
        earning_id,
        json!({ "amount": earning.amount.to_string() }),
    )
    .await;

    db::earnings::find(&state.pool, earning_id)
        .await?
        .ok_or_else(|| AppError::Internal("Earning vanished after update".into()))
}
