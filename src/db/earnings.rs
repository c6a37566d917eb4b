//! Driver earning queries
//!
//! Sums are computed over `Decimal` in code; SQLite has no exact decimal
//! aggregate over TEXT columns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::models::{DriverEarning, EarningStatus};

#[derive(sqlx::FromRow)]
struct EarningRow {
    id: String,
    driver_id: String,
    order_id: String,
    amount: String,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EarningRow> for DriverEarning {
    type Error = AppError;

    fn try_from(row: EarningRow) -> AppResult<DriverEarning> {
        let status = match row.status.as_str() {
            "CONFIRMED" => EarningStatus::Confirmed,
            "PAID" => EarningStatus::Paid,
            other => {
                return Err(AppError::database(format!("Unknown earning status: {other}")));
            }
        };
        let amount = Decimal::from_str(&row.amount)
            .map_err(|e| AppError::database(format!("Bad decimal in amount: {e}")))?;
        Ok(DriverEarning {
            id: row.id,
            driver_id: row.driver_id,
            order_id: row.order_id,
            amount,
            currency: row.currency,
            status,
            created_at: row.created_at,
        })
    }
}

pub async fn find(pool: &SqlitePool, earning_id: &str) -> AppResult<Option<DriverEarning>> {
    let row: Option<EarningRow> = sqlx::query_as("SELECT * FROM driver_earnings WHERE id = ?")
        .bind(earning_id)
        .fetch_optional(pool)
        .await?;
    row.map(DriverEarning::try_from).transpose()
}

pub async fn find_by_order(pool: &SqlitePool, order_id: &str) -> AppResult<Option<DriverEarning>> {
    let row: Option<EarningRow> =
        sqlx::query_as("SELECT * FROM driver_earnings WHERE order_id = ?")
            .bind(order_id)
            .fetch_optional(pool)
            .await?;
    row.map(DriverEarning::try_from).transpose()
}

/// CONFIRMED earnings for a driver, newest first, optional date range
pub async fn list_confirmed(
    pool: &SqlitePool,
    driver_id: &str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> AppResult<Vec<DriverEarning>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT * FROM driver_earnings WHERE driver_id = ",
    );
    qb.push_bind(driver_id);
    qb.push(" AND status = 'CONFIRMED'");
    if let Some(from) = from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = to {
        qb.push(" AND created_at <= ").push_bind(to);
    }
    qb.push(" ORDER BY created_at DESC");

    let rows: Vec<EarningRow> = qb.build_query_as().fetch_all(pool).await?;
    rows.into_iter().map(DriverEarning::try_from).collect()
}

/// Exact sum of a driver's earnings in one status
pub async fn sum_by_status(
    pool: &SqlitePool,
    driver_id: &str,
    status: EarningStatus,
) -> AppResult<Decimal> {
    let amounts: Vec<String> = sqlx::query_scalar(
        "SELECT amount FROM driver_earnings WHERE driver_id = ? AND status = ?",
    )
    .bind(driver_id)
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    let mut total = Decimal::ZERO;
    for amount in amounts {
        total += Decimal::from_str(&amount)
            .map_err(|e| AppError::database(format!("Bad decimal in amount: {e}")))?;
    }
    Ok(total)
}

/// Conditionally flip one CONFIRMED earning to PAID.
/// Returns false when the row was not CONFIRMED anymore.
pub async fn mark_paid(pool: &SqlitePool, earning_id: &str) -> AppResult<bool> {
    let result = sqlx::query(
        "UPDATE driver_earnings SET status = 'PAID' WHERE id = ? AND status = 'CONFIRMED'",
    )
    .bind(earning_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}
