//! Client and driver profile models
//!
//! Profile CRUD lives outside the engine; these records only anchor
//! ownership (`user_id -> profile id`) for the role guard.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClientProfile {
    pub id: String,
    pub user_id: String,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DriverProfile {
    pub id: String,
    pub user_id: String,
    pub vehicle: Option<String>,
    pub created_at: DateTime<Utc>,
}
