//! Order lifecycle state machine
//!
//! The transition table is data, not branching: each operation carries its
//! allowed source states and (static) target. Adding a transition is a table
//! change, and closure over `(status, action)` is mechanically checkable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    New,
    Published,
    Taken,
    InProgress,
    AtWarehouse,
    LoadingDone,
    InTransit,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 11] = [
        OrderStatus::Draft,
        OrderStatus::New,
        OrderStatus::Published,
        OrderStatus::Taken,
        OrderStatus::InProgress,
        OrderStatus::AtWarehouse,
        OrderStatus::LoadingDone,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::New => "NEW",
            OrderStatus::Published => "PUBLISHED",
            OrderStatus::Taken => "TAKEN",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::AtWarehouse => "AT_WAREHOUSE",
            OrderStatus::LoadingDone => "LOADING_DONE",
            OrderStatus::InTransit => "IN_TRANSIT",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// COMPLETED and CANCELLED accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Statuses during which the assigned driver counts as occupied
    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES.contains(self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown order status: {s}"))
    }
}

/// Unassigned orders in these states form the open pool drivers take from
pub const OPEN_STATUSES: [OrderStatus; 2] = [OrderStatus::New, OrderStatus::Published];

/// Client may edit order fields only in these states (pre-assignment)
pub const EDITABLE_STATUSES: [OrderStatus; 3] = [
    OrderStatus::New,
    OrderStatus::Draft,
    OrderStatus::Published,
];

/// A driver holding an order in any of these cannot take another
pub const ACTIVE_STATUSES: [OrderStatus; 6] = [
    OrderStatus::Taken,
    OrderStatus::InProgress,
    OrderStatus::AtWarehouse,
    OrderStatus::LoadingDone,
    OrderStatus::InTransit,
    OrderStatus::Delivered,
];

const NON_TERMINAL_STATUSES: [OrderStatus; 9] = [
    OrderStatus::Draft,
    OrderStatus::New,
    OrderStatus::Published,
    OrderStatus::Taken,
    OrderStatus::InProgress,
    OrderStatus::AtWarehouse,
    OrderStatus::LoadingDone,
    OrderStatus::InTransit,
    OrderStatus::Delivered,
];

/// Targets a driver may report through the progress operation
pub const PROGRESS_TARGETS: [OrderStatus; 6] = [
    OrderStatus::InProgress,
    OrderStatus::AtWarehouse,
    OrderStatus::LoadingDone,
    OrderStatus::InTransit,
    OrderStatus::Delivered,
    OrderStatus::Completed,
];

/// Lifecycle operations the engine validates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Update,
    Publish,
    Unpublish,
    Take,
    Start,
    /// Driver progress report; target supplied at call time
    UpdateStatus,
    Complete,
    Cancel,
    CancelByDriver,
}

impl OrderAction {
    pub const ALL: [OrderAction; 9] = [
        OrderAction::Update,
        OrderAction::Publish,
        OrderAction::Unpublish,
        OrderAction::Take,
        OrderAction::Start,
        OrderAction::UpdateStatus,
        OrderAction::Complete,
        OrderAction::Cancel,
        OrderAction::CancelByDriver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Update => "update",
            OrderAction::Publish => "publish",
            OrderAction::Unpublish => "unpublish",
            OrderAction::Take => "take",
            OrderAction::Start => "start",
            OrderAction::UpdateStatus => "update_status",
            OrderAction::Complete => "complete",
            OrderAction::Cancel => "cancel",
            OrderAction::CancelByDriver => "cancel_by_driver",
        }
    }
}

/// One row of the transition table
pub struct Transition {
    pub action: OrderAction,
    pub sources: &'static [OrderStatus],
    /// None when the target is supplied at call time (progress reports)
    pub target: Option<OrderStatus>,
}

/// The transition table: the whole lifecycle in one place
pub const TRANSITIONS: [Transition; 9] = [
    Transition {
        action: OrderAction::Update,
        sources: &EDITABLE_STATUSES,
        target: None, // status unchanged
    },
    Transition {
        action: OrderAction::Publish,
        sources: &[OrderStatus::Draft],
        target: Some(OrderStatus::Published),
    },
    Transition {
        action: OrderAction::Unpublish,
        sources: &[OrderStatus::Published],
        target: Some(OrderStatus::Draft),
    },
    Transition {
        action: OrderAction::Take,
        sources: &OPEN_STATUSES,
        target: Some(OrderStatus::Taken),
    },
    Transition {
        action: OrderAction::Start,
        sources: &[OrderStatus::Taken],
        target: Some(OrderStatus::InProgress),
    },
    Transition {
        action: OrderAction::UpdateStatus,
        sources: &NON_TERMINAL_STATUSES,
        target: None,
    },
    Transition {
        action: OrderAction::Complete,
        sources: &[
            OrderStatus::InProgress,
            OrderStatus::InTransit,
            OrderStatus::Delivered,
        ],
        target: Some(OrderStatus::Completed),
    },
    Transition {
        action: OrderAction::Cancel,
        sources: &[
            OrderStatus::New,
            OrderStatus::Draft,
            OrderStatus::Published,
            OrderStatus::Taken,
        ],
        target: Some(OrderStatus::Cancelled),
    },
    Transition {
        action: OrderAction::CancelByDriver,
        sources: &[OrderStatus::Taken],
        target: Some(OrderStatus::Published),
    },
];

/// Look up the table row for an action
pub fn transition(action: OrderAction) -> &'static Transition {
    let idx = match action {
        OrderAction::Update => 0,
        OrderAction::Publish => 1,
        OrderAction::Unpublish => 2,
        OrderAction::Take => 3,
        OrderAction::Start => 4,
        OrderAction::UpdateStatus => 5,
        OrderAction::Complete => 6,
        OrderAction::Cancel => 7,
        OrderAction::CancelByDriver => 8,
    };
    &TRANSITIONS[idx]
}

/// True if `action` may be invoked while the order is in `status`
pub fn is_allowed(action: OrderAction, status: OrderStatus) -> bool {
    transition(action).sources.contains(&status)
}
