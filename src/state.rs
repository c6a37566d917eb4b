//! Shared application state

use sqlx::SqlitePool;

use crate::config::Config;
use crate::notify::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_secret: String,
    /// Default currency for new orders
    pub currency: String,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            currency: config.currency.clone(),
            notifier: Notifier::new(),
        }
    }
}
