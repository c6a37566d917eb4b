//! Client / driver profile lookups
//!
//! Profile management is external; the engine only needs `user_id -> profile`
//! resolution plus seed helpers for fixtures.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{ClientProfile, DriverProfile};

pub async fn find_client_by_user(
    pool: &SqlitePool,
    user_id: &str,
) -> AppResult<Option<ClientProfile>> {
    let profile = sqlx::query_as("SELECT * FROM clients WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn find_driver_by_user(
    pool: &SqlitePool,
    user_id: &str,
) -> AppResult<Option<DriverProfile>> {
    let profile = sqlx::query_as("SELECT * FROM drivers WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn find_driver(pool: &SqlitePool, driver_id: &str) -> AppResult<Option<DriverProfile>> {
    let profile = sqlx::query_as("SELECT * FROM drivers WHERE id = ?")
        .bind(driver_id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn create_client(
    pool: &SqlitePool,
    user_id: &str,
    company_name: Option<&str>,
) -> AppResult<ClientProfile> {
    let profile = ClientProfile {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        company_name: company_name.map(str::to_string),
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO clients (id, user_id, company_name, created_at) VALUES (?, ?, ?, ?)")
        .bind(&profile.id)
        .bind(&profile.user_id)
        .bind(&profile.company_name)
        .bind(profile.created_at)
        .execute(pool)
        .await?;
    Ok(profile)
}

pub async fn create_driver(
    pool: &SqlitePool,
    user_id: &str,
    vehicle: Option<&str>,
) -> AppResult<DriverProfile> {
    let profile = DriverProfile {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        vehicle: vehicle.map(str::to_string),
        created_at: Utc::now(),
    };
    sqlx::query("INSERT INTO drivers (id, user_id, vehicle, created_at) VALUES (?, ?, ?, ?)")
        .bind(&profile.id)
        .bind(&profile.user_id)
        .bind(&profile.vehicle)
        .bind(profile.created_at)
        .execute(pool)
        .await?;
    Ok(profile)
}
