//! Order and status-history queries
//!
//! All lifecycle transitions are single transactions whose first statement is
//! a conditional UPDATE keyed on the precondition fields (`status`,
//! `driver_id`). Zero affected rows means the precondition was lost; the
//! caller decides how to report it. No application-level locking: the scheme
//! stays correct across horizontally scaled instances.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    AvailableQuery, CreateOrderRequest, DriverEarning, EarningStatus, Order, StatusHistoryEntry,
    UpdateOrderRequest,
};
use crate::orders::lifecycle::{ACTIVE_STATUSES, EDITABLE_STATUSES, OPEN_STATUSES, OrderStatus};

/// Raw order row; decimals and status are parsed into [`Order`]
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    client_id: String,
    driver_id: Option<String>,
    from_warehouse_id: Option<String>,
    to_address: String,
    to_latitude: Option<f64>,
    to_longitude: Option<f64>,
    preferred_date: chrono::NaiveDate,
    preferred_time_from: Option<String>,
    preferred_time_to: Option<String>,
    cargo_type: Option<String>,
    cargo_volume: Option<String>,
    cargo_weight: Option<f64>,
    cargo_places: Option<i64>,
    pickup_required: bool,
    special_conditions: Option<String>,
    contact_name: Option<String>,
    contact_phone: Option<String>,
    response_deadline: Option<DateTime<Utc>>,
    price: Option<String>,
    agreed_price: Option<String>,
    payment_type: Option<String>,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_decimal(value: Option<String>, column: &str) -> AppResult<Option<Decimal>> {
    value
        .map(|v| {
            Decimal::from_str(&v)
                .map_err(|e| AppError::database(format!("Bad decimal in {column}: {e}")))
        })
        .transpose()
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> AppResult<Order> {
        Ok(Order {
            status: OrderStatus::from_str(&row.status).map_err(AppError::database)?,
            price: parse_decimal(row.price, "price")?,
            agreed_price: parse_decimal(row.agreed_price, "agreed_price")?,
            id: row.id,
            order_number: row.order_number,
            client_id: row.client_id,
            driver_id: row.driver_id,
            from_warehouse_id: row.from_warehouse_id,
            to_address: row.to_address,
            to_latitude: row.to_latitude,
            to_longitude: row.to_longitude,
            preferred_date: row.preferred_date,
            preferred_time_from: row.preferred_time_from,
            preferred_time_to: row.preferred_time_to,
            cargo_type: row.cargo_type,
            cargo_volume: row.cargo_volume,
            cargo_weight: row.cargo_weight,
            cargo_places: row.cargo_places,
            pickup_required: row.pickup_required,
            special_conditions: row.special_conditions,
            contact_name: row.contact_name,
            contact_phone: row.contact_phone,
            response_deadline: row.response_deadline,
            payment_type: row.payment_type,
            currency: row.currency,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    order_id: String,
    status: String,
    comment: Option<String>,
    changed_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for StatusHistoryEntry {
    type Error = AppError;

    fn try_from(row: HistoryRow) -> AppResult<StatusHistoryEntry> {
        Ok(StatusHistoryEntry {
            status: OrderStatus::from_str(&row.status).map_err(AppError::database)?,
            id: row.id,
            order_id: row.order_id,
            comment: row.comment,
            changed_by: row.changed_by,
            created_at: row.created_at,
        })
    }
}

/// Render a trusted status slice as a SQL IN list
fn status_list(statuses: &[OrderStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of the completion transaction
pub enum CompleteOutcome {
    /// Order reached COMPLETED; exactly one earning row was created
    Completed(DriverEarning),
    /// Conditional update matched no row (wrong state or no driver)
    StateMismatch,
    /// Neither agreed price nor price is set; transaction rolled back
    MissingAmount,
}

/// Atomically bump the per-year counter and format the order number
async fn next_order_number(conn: &mut SqliteConnection, year: i32) -> AppResult<String> {
    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO order_numbers (year, seq) VALUES (?, 1)
        ON CONFLICT(year) DO UPDATE SET seq = seq + 1
        RETURNING seq
        "#,
    )
    .bind(year)
    .fetch_one(conn)
    .await?;
    Ok(format!("ORD-{year}-{seq:05}"))
}

async fn insert_history(
    conn: &mut SqliteConnection,
    order_id: &str,
    status: OrderStatus,
    comment: Option<&str>,
    changed_by: &str,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_status_history (order_id, status, comment, changed_by, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(order_id)
    .bind(status.as_str())
    .bind(comment)
    .bind(changed_by)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Create an order in NEW, assign its number, append the first history row
pub async fn create(
    pool: &SqlitePool,
    client_id: &str,
    req: &CreateOrderRequest,
    currency: &str,
    changed_by: &str,
) -> AppResult<Order> {
    let now = Utc::now();
    let id = Uuid::new_v4().to_string();

    let mut tx = pool.begin().await?;

    let order_number = next_order_number(&mut tx, now.year()).await?;

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, client_id, driver_id, from_warehouse_id,
            to_address, to_latitude, to_longitude,
            preferred_date, preferred_time_from, preferred_time_to,
            cargo_type, cargo_volume, cargo_weight, cargo_places,
            pickup_required, special_conditions, contact_name, contact_phone,
            response_deadline, price, agreed_price, payment_type, currency,
            status, created_at, updated_at
        ) VALUES (?, ?, ?, NULL, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&order_number)
    .bind(client_id)
    .bind(&req.from_warehouse_id)
    .bind(&req.to_address)
    .bind(req.to_latitude)
    .bind(req.to_longitude)
    .bind(req.preferred_date)
    .bind(&req.preferred_time_from)
    .bind(&req.preferred_time_to)
    .bind(&req.cargo_type)
    .bind(&req.cargo_volume)
    .bind(req.cargo_weight)
    .bind(req.cargo_places)
    .bind(req.pickup_required)
    .bind(&req.special_conditions)
    .bind(&req.contact_name)
    .bind(&req.contact_phone)
    .bind(req.response_deadline)
    .bind(req.price.map(|p| p.to_string()))
    .bind(&req.payment_type)
    .bind(currency)
    .bind(OrderStatus::New.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    insert_history(
        &mut tx,
        &id,
        OrderStatus::New,
        Some("Order created"),
        changed_by,
        now,
    )
    .await?;

    tx.commit().await?;

    find(pool, &id)
        .await?
        .ok_or_else(|| AppError::Internal("Created order vanished".into()))
}

pub async fn find(pool: &SqlitePool, order_id: &str) -> AppResult<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    row.map(Order::try_from).transpose()
}

/// Full audit trail of the order, in commit order
pub async fn history(pool: &SqlitePool, order_id: &str) -> AppResult<Vec<StatusHistoryEntry>> {
    let rows: Vec<HistoryRow> = sqlx::query_as(
        "SELECT * FROM order_status_history WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(StatusHistoryEntry::try_from).collect()
}

pub async fn list_for_client(
    pool: &SqlitePool,
    client_id: &str,
    status: Option<OrderStatus>,
) -> AppResult<Vec<Order>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM orders WHERE client_id = ");
    qb.push_bind(client_id);
    if let Some(status) = status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    qb.push(" ORDER BY created_at DESC");

    let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(pool).await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// Open pool: unassigned orders in the takeable states, newest first
pub async fn list_available(
    pool: &SqlitePool,
    filter: &AvailableQuery,
) -> AppResult<Vec<Order>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT * FROM orders WHERE driver_id IS NULL AND status IN ({})",
        status_list(&OPEN_STATUSES)
    ));
    if let Some(from) = filter.date_from {
        qb.push(" AND preferred_date >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND preferred_date <= ").push_bind(to);
    }
    if let Some(min) = filter.price_min.and_then(|p| p.to_f64()) {
        qb.push(" AND CAST(price AS REAL) >= ").push_bind(min);
    }
    if let Some(max) = filter.price_max.and_then(|p| p.to_f64()) {
        qb.push(" AND CAST(price AS REAL) <= ").push_bind(max);
    }
    qb.push(" ORDER BY created_at DESC");

    let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(pool).await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// Orders the driver currently holds in an active status
pub async fn list_for_driver(pool: &SqlitePool, driver_id: &str) -> AppResult<Vec<Order>> {
    let sql = format!(
        "SELECT * FROM orders WHERE driver_id = ? AND status IN ({}) ORDER BY updated_at DESC",
        status_list(&ACTIVE_STATUSES)
    );
    let rows: Vec<OrderRow> = sqlx::query_as(&sql).bind(driver_id).fetch_all(pool).await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// True if the driver holds any order in an active status
pub async fn driver_has_active_order(pool: &SqlitePool, driver_id: &str) -> AppResult<bool> {
    let sql = format!(
        "SELECT COUNT(*) FROM orders WHERE driver_id = ? AND status IN ({})",
        status_list(&ACTIVE_STATUSES)
    );
    let count: i64 = sqlx::query_scalar(&sql).bind(driver_id).fetch_one(pool).await?;
    Ok(count > 0)
}

/// Apply a field patch, conditional on the order still being editable.
/// Returns false when the editable precondition no longer holds.
pub async fn apply_update(
    pool: &SqlitePool,
    order_id: &str,
    patch: &UpdateOrderRequest,
) -> AppResult<bool> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE orders SET updated_at = ");
    qb.push_bind(Utc::now());

    macro_rules! set_field {
        ($col:literal, $val:expr) => {
            if let Some(v) = $val {
                qb.push(concat!(", ", $col, " = ")).push_bind(v);
            }
        };
    }

    set_field!("from_warehouse_id", &patch.from_warehouse_id);
    set_field!("to_address", &patch.to_address);
    set_field!("to_latitude", patch.to_latitude);
    set_field!("to_longitude", patch.to_longitude);
    set_field!("preferred_date", patch.preferred_date);
    set_field!("preferred_time_from", &patch.preferred_time_from);
    set_field!("preferred_time_to", &patch.preferred_time_to);
    set_field!("cargo_type", &patch.cargo_type);
    set_field!("cargo_volume", &patch.cargo_volume);
    set_field!("cargo_weight", patch.cargo_weight);
    set_field!("cargo_places", patch.cargo_places);
    set_field!("pickup_required", patch.pickup_required);
    set_field!("special_conditions", &patch.special_conditions);
    set_field!("contact_name", &patch.contact_name);
    set_field!("contact_phone", &patch.contact_phone);
    set_field!("response_deadline", patch.response_deadline);
    set_field!("price", patch.price.map(|p| p.to_string()));
    set_field!("payment_type", &patch.payment_type);

    qb.push(" WHERE id = ").push_bind(order_id);
    qb.push(format!(" AND status IN ({})", status_list(&EDITABLE_STATUSES)));

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected() == 1)
}

/// Compare-and-set take: assign the driver, snapshot the agreed price, append
/// history — all or nothing. Returns false when the order was already
/// assigned or left the open pool.
pub async fn try_take(
    pool: &SqlitePool,
    order_id: &str,
    driver_id: &str,
    changed_by: &str,
) -> AppResult<bool> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let sql = format!(
        r#"
        UPDATE orders
        SET driver_id = ?, status = ?, agreed_price = COALESCE(agreed_price, price), updated_at = ?
        WHERE id = ? AND driver_id IS NULL AND status IN ({})
        "#,
        status_list(&OPEN_STATUSES)
    );
    let result = sqlx::query(&sql)
        .bind(driver_id)
        .bind(OrderStatus::Taken.as_str())
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    insert_history(
        &mut tx,
        order_id,
        OrderStatus::Taken,
        Some("Taken by driver"),
        changed_by,
        now,
    )
    .await?;

    tx.commit().await?;
    Ok(true)
}

/// Generic conditional transition with its history row.
/// Returns false when the source-state precondition no longer holds.
pub async fn try_transition(
    pool: &SqlitePool,
    order_id: &str,
    sources: &[OrderStatus],
    target: OrderStatus,
    clear_driver: bool,
    comment: Option<&str>,
    changed_by: &str,
) -> AppResult<bool> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let driver_clause = if clear_driver { ", driver_id = NULL" } else { "" };
    let sql = format!(
        "UPDATE orders SET status = ?, updated_at = ?{driver_clause} WHERE id = ? AND status IN ({})",
        status_list(sources)
    );
    let result = sqlx::query(&sql)
        .bind(target.as_str())
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    insert_history(&mut tx, order_id, target, comment, changed_by, now).await?;

    tx.commit().await?;
    Ok(true)
}

/// Completion: flip to COMPLETED, resolve the billable amount, create exactly
/// one CONFIRMED earning row, append history — one transaction.
pub async fn try_complete(
    pool: &SqlitePool,
    order_id: &str,
    sources: &[OrderStatus],
    comment: Option<&str>,
    changed_by: &str,
) -> AppResult<CompleteOutcome> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let sql = format!(
        r#"
        UPDATE orders
        SET status = ?, agreed_price = COALESCE(agreed_price, price), updated_at = ?
        WHERE id = ? AND driver_id IS NOT NULL AND status IN ({})
        "#,
        status_list(sources)
    );
    let result = sqlx::query(&sql)
        .bind(OrderStatus::Completed.as_str())
        .bind(now)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(CompleteOutcome::StateMismatch);
    }

    let (driver_id, agreed_price, currency): (String, Option<String>, String) =
        sqlx::query_as("SELECT driver_id, agreed_price, currency FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_one(&mut *tx)
            .await?;

    // Rolls back the status flip too: never complete with an unresolved amount.
    let Some(amount) = parse_decimal(agreed_price, "agreed_price")? else {
        return Ok(CompleteOutcome::MissingAmount);
    };

    let earning = DriverEarning {
        id: Uuid::new_v4().to_string(),
        driver_id,
        order_id: order_id.to_string(),
        amount,
        currency,
        status: EarningStatus::Confirmed,
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO driver_earnings (id, driver_id, order_id, amount, currency, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&earning.id)
    .bind(&earning.driver_id)
    .bind(&earning.order_id)
    .bind(earning.amount.to_string())
    .bind(&earning.currency)
    .bind(earning.status.as_str())
    .bind(earning.created_at)
    .execute(&mut *tx)
    .await?;

    insert_history(
        &mut tx,
        order_id,
        OrderStatus::Completed,
        comment,
        changed_by,
        now,
    )
    .await?;

    tx.commit().await?;
    Ok(CompleteOutcome::Completed(earning))
}
