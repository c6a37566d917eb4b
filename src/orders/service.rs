//! Order operations
//!
//! Each operation follows the same shape: validate payload, check the caller
//! (ownership before state, so Forbidden wins over PreconditionFailed), then
//! delegate the actual state change to a conditional UPDATE in the db layer.
//! Audit and notification run after commit and never fail the operation.

use serde_json::json;
use validator::Validate;

use crate::auth::Identity;
use crate::db;
use crate::db::orders::CompleteOutcome;
use crate::error::{AppError, AppResult};
use crate::models::{
    AvailableQuery, CreateOrderRequest, CreateRatingRequest, Order, OrderView, Rating,
    RatingSummary, UpdateOrderRequest, UpdateStatusRequest,
};
use crate::orders::guard;
use crate::orders::lifecycle::{self, OrderAction, OrderStatus, PROGRESS_TARGETS};
use crate::state::AppState;

async fn load(state: &AppState, order_id: &str) -> AppResult<Order> {
    db::orders::find(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))
}

async fn reload_view(state: &AppState, order_id: &str) -> AppResult<OrderView> {
    Ok(OrderView::new(load(state, order_id).await?))
}

/// Create an order for the calling client; it enters NEW with a fresh number
pub async fn create(
    state: &AppState,
    identity: &Identity,
    req: CreateOrderRequest,
) -> AppResult<OrderView> {
    req.validate()?;
    let client_id = guard::require_client(identity)?;

    let order = db::orders::create(
        &state.pool,
        client_id,
        &req,
        &state.currency,
        &identity.user_id,
    )
    .await?;

    db::audit::record(
        &state.pool,
        &identity.user_id,
        "order.create",
        "order",
        &order.id,
        json!({ "order_number": order.order_number }),
    )
    .await;
    state.notifier.notify_new_order(&order.id);

    Ok(OrderView::new(order))
}

/// Fetch one order with its full status history; parties only
pub async fn get(state: &AppState, identity: &Identity, order_id: &str) -> AppResult<OrderView> {
    let order = load(state, order_id).await?;
    guard::ensure_party(&order, identity)?;
    let history = db::orders::history(&state.pool, order_id).await?;
    Ok(OrderView::with_history(order, history))
}

/// The calling client's orders, optionally filtered by status
pub async fn list_for_client(
    state: &AppState,
    identity: &Identity,
    status: Option<OrderStatus>,
) -> AppResult<Vec<OrderView>> {
    let client_id = guard::require_client(identity)?;
    let orders = db::orders::list_for_client(&state.pool, client_id, status).await?;
    Ok(orders.into_iter().map(OrderView::new).collect())
}

/// The open pool, visible to any driver
pub async fn list_available(
    state: &AppState,
    identity: &Identity,
    filter: &AvailableQuery,
) -> AppResult<Vec<OrderView>> {
    guard::require_driver(identity)?;
    let orders = db::orders::list_available(&state.pool, filter).await?;
    Ok(orders.into_iter().map(OrderView::new).collect())
}

/// Orders the calling driver currently holds
pub async fn list_mine(state: &AppState, identity: &Identity) -> AppResult<Vec<OrderView>> {
    let driver_id = guard::require_driver(identity)?;
    let orders = db::orders::list_for_driver(&state.pool, driver_id).await?;
    Ok(orders.into_iter().map(OrderView::new).collect())
}

/// Patch order fields; owner only, pre-assignment states only
pub async fn update(
    state: &AppState,
    identity: &Identity,
    order_id: &str,
    patch: UpdateOrderRequest,
) -> AppResult<OrderView> {
    patch.validate()?;
    if patch.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }

    let order = load(state, order_id).await?;
    guard::ensure_owner_client(&order, identity)?;
    if !lifecycle::is_allowed(OrderAction::Update, order.status) {
        return Err(AppError::precondition(format!(
            "Order in {} cannot be edited",
            order.status
        )));
    }

    // The UPDATE re-checks editability; a lost race surfaces as Conflict.
    if !db::orders::apply_update(&state.pool, order_id, &patch).await? {
        return Err(AppError::conflict("Order is no longer editable"));
    }

    reload_view(state, order_id).await
}

/// DRAFT -> PUBLISHED; the order joins the open pool
pub async fn publish(state: &AppState, identity: &Identity, order_id: &str) -> AppResult<OrderView> {
    let order = load(state, order_id).await?;
    guard::ensure_owner_client(&order, identity)?;

    let row = lifecycle::transition(OrderAction::Publish);
    let done = db::orders::try_transition(
        &state.pool,
        order_id,
        row.sources,
        OrderStatus::Published,
        false,
        Some("Published by client"),
        &identity.user_id,
    )
    .await?;
    if !done {
        return Err(AppError::precondition(format!(
            "Order in {} cannot be published",
            order.status
        )));
    }

    state.notifier.notify_new_order(order_id);
    reload_view(state, order_id).await
}

/// PUBLISHED -> DRAFT; the order leaves the open pool
pub async fn unpublish(
    state: &AppState,
    identity: &Identity,
    order_id: &str,
) -> AppResult<OrderView> {
    let order = load(state, order_id).await?;
    guard::ensure_owner_client(&order, identity)?;

    let row = lifecycle::transition(OrderAction::Unpublish);
    let done = db::orders::try_transition(
        &state.pool,
        order_id,
        row.sources,
        OrderStatus::Draft,
        false,
        Some("Unpublished by client"),
        &identity.user_id,
    )
    .await?;
    if !done {
        return Err(AppError::precondition(format!(
            "Order in {} cannot be unpublished",
            order.status
        )));
    }

    reload_view(state, order_id).await
}

/// Driver takes an unassigned order from the open pool.
///
/// The assignment itself is a compare-and-set; under contention exactly one
/// caller wins and every loser gets Conflict.
pub async fn take(state: &AppState, identity: &Identity, order_id: &str) -> AppResult<OrderView> {
    let driver_id = guard::require_driver(identity)?;

    if db::orders::driver_has_active_order(&state.pool, driver_id).await? {
        return Err(AppError::precondition(
            "Driver already has an active order",
        ));
    }

    if !db::orders::try_take(&state.pool, order_id, driver_id, &identity.user_id).await? {
        // Lost the CAS; re-read to tell "gone" from "taken" from "not open".
        let order = load(state, order_id).await?;
        if order.driver_id.is_some() {
            return Err(AppError::conflict("Order was already taken"));
        }
        return Err(AppError::precondition(format!(
            "Order in {} is not available",
            order.status
        )));
    }

    db::audit::record(
        &state.pool,
        &identity.user_id,
        "order.take",
        "order",
        order_id,
        json!({ "driver_id": driver_id }),
    )
    .await;
    state.notifier.notify_taken(order_id);

    reload_view(state, order_id).await
}

/// TAKEN -> IN_PROGRESS, by the assigned driver
pub async fn start(state: &AppState, identity: &Identity, order_id: &str) -> AppResult<OrderView> {
    let order = load(state, order_id).await?;
    guard::ensure_assigned_driver(&order, identity)?;

    let row = lifecycle::transition(OrderAction::Start);
    let done = db::orders::try_transition(
        &state.pool,
        order_id,
        row.sources,
        OrderStatus::InProgress,
        false,
        Some("Work started"),
        &identity.user_id,
    )
    .await?;
    if !done {
        return Err(AppError::precondition(format!(
            "Order in {} cannot be started",
            order.status
        )));
    }

    reload_view(state, order_id).await
}

/// Driver progress report. A COMPLETED target routes through the completion
/// transaction so the earning row is created exactly once regardless of which
/// endpoint finished the order.
pub async fn update_status(
    state: &AppState,
    identity: &Identity,
    order_id: &str,
    req: UpdateStatusRequest,
) -> AppResult<OrderView> {
    let order = load(state, order_id).await?;
    guard::ensure_assigned_driver(&order, identity)?;

    if !PROGRESS_TARGETS.contains(&req.status) {
        return Err(AppError::validation(format!(
            "{} is not a reportable progress status",
            req.status
        )));
    }

    if req.status == OrderStatus::Completed {
        return finish(state, identity, order_id, order, req.comment.as_deref()).await;
    }

    let row = lifecycle::transition(OrderAction::UpdateStatus);
    let done = db::orders::try_transition(
        &state.pool,
        order_id,
        row.sources,
        req.status,
        false,
        req.comment.as_deref(),
        &identity.user_id,
    )
    .await?;
    if !done {
        return Err(AppError::precondition(format!(
            "Order in {} accepts no progress updates",
            order.status
        )));
    }

    reload_view(state, order_id).await
}

/// Client confirms completion of their order
pub async fn complete(
    state: &AppState,
    identity: &Identity,
    order_id: &str,
    comment: Option<&str>,
) -> AppResult<OrderView> {
    let order = load(state, order_id).await?;
    guard::ensure_owner_client(&order, identity)?;
    finish(state, identity, order_id, order, comment).await
}

/// Shared completion tail for both the client and the driver path
async fn finish(
    state: &AppState,
    identity: &Identity,
    order_id: &str,
    order: Order,
    comment: Option<&str>,
) -> AppResult<OrderView> {
    let row = lifecycle::transition(OrderAction::Complete);
    let outcome =
        db::orders::try_complete(&state.pool, order_id, row.sources, comment, &identity.user_id)
            .await?;

    let earning = match outcome {
        CompleteOutcome::Completed(earning) => earning,
        CompleteOutcome::StateMismatch => {
            if order.driver_id.is_none() {
                return Err(AppError::precondition(
                    "Order has no assigned driver to complete for",
                ));
            }
            return Err(AppError::precondition(format!(
                "Order in {} cannot be completed",
                order.status
            )));
        }
        CompleteOutcome::MissingAmount => {
            return Err(AppError::InvariantViolation(
                "Order has no billable amount; completion rolled back".into(),
            ));
        }
    };

    db::audit::record(
        &state.pool,
        &identity.user_id,
        "order.complete",
        "order",
        order_id,
        json!({ "earning_id": earning.id, "amount": earning.amount.to_string() }),
    )
    .await;
    state.notifier.notify_completed(order_id);

    reload_view(state, order_id).await
}

/// Client cancels; any assigned driver is released
pub async fn cancel(
    state: &AppState,
    identity: &Identity,
    order_id: &str,
    comment: Option<&str>,
) -> AppResult<OrderView> {
    let order = load(state, order_id).await?;
    guard::ensure_owner_client(&order, identity)?;

    let row = lifecycle::transition(OrderAction::Cancel);
    let done = db::orders::try_transition(
        &state.pool,
        order_id,
        row.sources,
        OrderStatus::Cancelled,
        true,
        comment.or(Some("Cancelled by client")),
        &identity.user_id,
    )
    .await?;
    if !done {
        return Err(AppError::precondition(format!(
            "Order in {} cannot be cancelled",
            order.status
        )));
    }

    db::audit::record(
        &state.pool,
        &identity.user_id,
        "order.cancel",
        "order",
        order_id,
        json!({}),
    )
    .await;

    reload_view(state, order_id).await
}

/// Assigned driver declines a TAKEN order; it returns to the open pool
pub async fn cancel_by_driver(
    state: &AppState,
    identity: &Identity,
    order_id: &str,
    comment: Option<&str>,
) -> AppResult<OrderView> {
    let order = load(state, order_id).await?;
    guard::ensure_assigned_driver(&order, identity)?;

    let row = lifecycle::transition(OrderAction::CancelByDriver);
    let done = db::orders::try_transition(
        &state.pool,
        order_id,
        row.sources,
        OrderStatus::Published,
        true,
        comment.or(Some("Declined by driver")),
        &identity.user_id,
    )
    .await?;
    if !done {
        return Err(AppError::precondition(format!(
            "Order in {} cannot be declined",
            order.status
        )));
    }

    db::audit::record(
        &state.pool,
        &identity.user_id,
        "order.decline",
        "order",
        order_id,
        json!({}),
    )
    .await;
    // Back in the pool, so drivers hear about it again.
    state.notifier.notify_new_order(order_id);

    reload_view(state, order_id).await
}

/// Rate a completed order. The caller must be a party; each party rates once.
pub async fn rate(
    state: &AppState,
    identity: &Identity,
    order_id: &str,
    req: CreateRatingRequest,
) -> AppResult<Rating> {
    req.validate()?;
    let order = load(state, order_id).await?;

    let rater_role = if identity
        .client_id
        .as_deref()
        .is_some_and(|id| order.client_id == id)
    {
        crate::auth::Role::Client
    } else if identity
        .driver_id
        .as_deref()
        .is_some_and(|id| order.driver_id.as_deref() == Some(id))
    {
        crate::auth::Role::Driver
    } else {
        return Err(AppError::forbidden("No access to this order"));
    };

    if order.status != OrderStatus::Completed {
        return Err(AppError::precondition(
            "Only completed orders can be rated",
        ));
    }

    db::ratings::create(
        &state.pool,
        order_id,
        rater_role,
        &identity.user_id,
        req.score,
        req.comment.as_deref(),
    )
    .await
}

/// Ratings a driver received from clients, with the running average
pub async fn ratings_for_driver(state: &AppState, driver_id: &str) -> AppResult<RatingSummary> {
    if db::profiles::find_driver(&state.pool, driver_id)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Driver not found"));
    }

    let ratings = db::ratings::list_for_driver(&state.pool, driver_id).await?;
    let count = ratings.len() as i64;
    let average = if count > 0 {
        let sum: i64 = ratings.iter().map(|r| r.score).sum();
        Some((rust_decimal::Decimal::from(sum) / rust_decimal::Decimal::from(count)).round_dp(2))
    } else {
        None
    };

    Ok(RatingSummary {
        count,
        average,
        ratings,
    })
}
