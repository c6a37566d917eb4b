//! Database access layer
//!
//! Pool initialization plus plain async query functions per table.

pub mod audit;
pub mod earnings;
pub mod orders;
pub mod profiles;
pub mod ratings;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::error::AppError;

/// Open the SQLite pool (WAL mode) and apply migrations
pub async fn connect(db_path: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
        .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        // wait out write contention instead of failing immediately
        .busy_timeout(Duration::from_secs(5))
        .pragma("foreign_keys", "ON");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

    tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
