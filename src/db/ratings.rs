//! Rating queries

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::Role;
use crate::error::{AppError, AppResult};
use crate::models::Rating;

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: String,
    order_id: String,
    rater_role: String,
    rater_user_id: String,
    score: i64,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = AppError;

    fn try_from(row: RatingRow) -> AppResult<Rating> {
        let rater_role = match row.rater_role.as_str() {
            "CLIENT" => Role::Client,
            "DRIVER" => Role::Driver,
            other => return Err(AppError::database(format!("Unknown rater role: {other}"))),
        };
        Ok(Rating {
            id: row.id,
            order_id: row.order_id,
            rater_role,
            rater_user_id: row.rater_user_id,
            score: row.score,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

/// Insert a rating; the UNIQUE(order_id, rater_role) index rejects doubles
pub async fn create(
    pool: &SqlitePool,
    order_id: &str,
    rater_role: Role,
    rater_user_id: &str,
    score: i64,
    comment: Option<&str>,
) -> AppResult<Rating> {
    let rating = Rating {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.to_string(),
        rater_role,
        rater_user_id: rater_user_id.to_string(),
        score,
        comment: comment.map(str::to_string),
        created_at: Utc::now(),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO ratings (id, order_id, rater_role, rater_user_id, score, comment, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&rating.id)
    .bind(&rating.order_id)
    .bind(rating.rater_role.as_str())
    .bind(&rating.rater_user_id)
    .bind(rating.score)
    .bind(&rating.comment)
    .bind(rating.created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(rating),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::conflict(
            "This order is already rated by this party",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Ratings received by a driver (i.e. left by clients on the driver's orders)
pub async fn list_for_driver(pool: &SqlitePool, driver_id: &str) -> AppResult<Vec<Rating>> {
    let rows: Vec<RatingRow> = sqlx::query_as(
        r#"
        SELECT r.* FROM ratings r
        JOIN orders o ON o.id = r.order_id
        WHERE o.driver_id = ? AND r.rater_role = 'CLIENT'
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(driver_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Rating::try_from).collect()
}
