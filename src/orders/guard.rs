//! Role and ownership guard
//!
//! One reusable predicate set, evaluated before any state check so that
//! "wrong person" (Forbidden) is always distinguishable from "wrong time"
//! (PreconditionFailed).

use crate::auth::{Identity, Role};
use crate::error::{AppError, AppResult};
use crate::models::Order;

/// The caller must act as a client and have a client profile
pub fn require_client(identity: &Identity) -> AppResult<&str> {
    if identity.role != Role::Client {
        return Err(AppError::forbidden("Client role required"));
    }
    identity
        .client_id
        .as_deref()
        .ok_or_else(|| AppError::forbidden("Client profile not found"))
}

/// The caller must act as a driver and have a driver profile
pub fn require_driver(identity: &Identity) -> AppResult<&str> {
    if identity.role != Role::Driver {
        return Err(AppError::forbidden("Driver role required"));
    }
    identity
        .driver_id
        .as_deref()
        .ok_or_else(|| AppError::forbidden("Driver profile not found"))
}

/// The caller must be the order's owning client
pub fn ensure_owner_client<'a>(order: &Order, identity: &'a Identity) -> AppResult<&'a str> {
    let client_id = require_client(identity)?;
    if order.client_id != client_id {
        return Err(AppError::forbidden("Not your order"));
    }
    Ok(client_id)
}

/// The caller must be the order's assigned driver
pub fn ensure_assigned_driver<'a>(order: &Order, identity: &'a Identity) -> AppResult<&'a str> {
    let driver_id = require_driver(identity)?;
    if order.driver_id.as_deref() != Some(driver_id) {
        return Err(AppError::forbidden("Not your order"));
    }
    Ok(driver_id)
}

/// Read access: owning client or assigned driver
pub fn ensure_party(order: &Order, identity: &Identity) -> AppResult<()> {
    let is_client = identity
        .client_id
        .as_deref()
        .is_some_and(|id| order.client_id == id);
    let is_driver = identity
        .driver_id
        .as_deref()
        .is_some_and(|id| order.driver_id.as_deref() == Some(id));
    if !is_client && !is_driver {
        return Err(AppError::forbidden("No access to this order"));
    }
    Ok(())
}
