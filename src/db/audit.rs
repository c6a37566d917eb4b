//! Audit log sink
//!
//! Best-effort: failures are logged and never escalate into the operation's
//! result. Called after the core transactional write commits.

use chrono::Utc;
use sqlx::SqlitePool;

/// Record an audit entry; swallows errors with a warning
pub async fn record(
    pool: &SqlitePool,
    user_id: &str,
    action: &str,
    entity_type: &str,
    entity_id: &str,
    payload: serde_json::Value,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_logs (user_id, action, entity_type, entity_id, payload, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(payload.to_string())
    .bind(Utc::now())
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(action, entity_id, error = %e, "Audit log write failed");
    }
}
