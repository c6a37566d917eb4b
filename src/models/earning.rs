//! Driver earning model and reporting payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Earning lifecycle: created CONFIRMED on order completion, PAID on payout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EarningStatus {
    Confirmed,
    Paid,
}

impl EarningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EarningStatus::Confirmed => "CONFIRMED",
            EarningStatus::Paid => "PAID",
        }
    }
}

/// One row per completed order, the money owed to a driver
#[derive(Debug, Clone, Serialize)]
pub struct DriverEarning {
    pub id: String,
    pub driver_id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: EarningStatus,
    pub created_at: DateTime<Utc>,
}

/// Per-order line in the earnings report
#[derive(Debug, Serialize)]
pub struct EarningOrder {
    pub id: String,
    pub agreed_price: Decimal,
    pub completed_at: DateTime<Utc>,
}

/// CONFIRMED earnings for a driver over an optional date range
#[derive(Debug, Serialize)]
pub struct EarningsReport {
    pub total_amount: Decimal,
    pub currency: String,
    pub orders: Vec<EarningOrder>,
}

/// Running balance: sum(CONFIRMED) - sum(PAID), floored at zero
#[derive(Debug, Serialize)]
pub struct BalanceReport {
    pub total_confirmed: Decimal,
    pub total_paid: Decimal,
    pub balance_to_pay: Decimal,
    pub currency: String,
}
