//! Rating model
//!
//! One row per (order, rater role): client and driver may each rate the
//! other exactly once per completed order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::Role;

#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    pub id: String,
    pub order_id: String,
    pub rater_role: Role,
    pub rater_user_id: String,
    pub score: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create rating payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRatingRequest {
    #[validate(range(min = 1, max = 5))]
    pub score: i64,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

/// Aggregated view of a driver's received ratings
#[derive(Debug, Serialize)]
pub struct RatingSummary {
    pub count: i64,
    pub average: Option<Decimal>,
    pub ratings: Vec<Rating>,
}
