//! Order model and payloads

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::orders::lifecycle::OrderStatus;
use crate::orders::payment::PaymentKind;

/// Order entity — the central record of one delivery request
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: String,
    /// Human-readable number, `ORD-<year>-<5-digit-seq>`, assigned once
    pub order_number: String,
    pub client_id: String,
    /// Set exactly once when a driver takes the order; cleared by cancel paths
    pub driver_id: Option<String>,
    pub from_warehouse_id: Option<String>,
    pub to_address: String,
    pub to_latitude: Option<f64>,
    pub to_longitude: Option<f64>,
    pub preferred_date: NaiveDate,
    pub preferred_time_from: Option<String>,
    pub preferred_time_to: Option<String>,
    pub cargo_type: Option<String>,
    pub cargo_volume: Option<String>,
    pub cargo_weight: Option<f64>,
    pub cargo_places: Option<i64>,
    pub pickup_required: bool,
    pub special_conditions: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub response_deadline: Option<DateTime<Utc>>,
    /// Client's asking amount
    pub price: Option<Decimal>,
    /// Snapshotted from `price` at assignment; authoritative for billing
    pub agreed_price: Option<Decimal>,
    pub payment_type: Option<String>,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable row of the order's audit trail
#[derive(Debug, Clone, Serialize)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub order_id: String,
    pub status: OrderStatus,
    pub comment: Option<String>,
    pub changed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Order view returned from the API: order fields plus derived attributes
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    /// Reporting-only classification derived from the free-text payment type
    pub payment_kind: Option<PaymentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_history: Option<Vec<StatusHistoryEntry>>,
}

impl OrderView {
    pub fn new(order: Order) -> Self {
        let payment_kind = order.payment_type.as_deref().map(PaymentKind::classify);
        Self {
            order,
            payment_kind,
            status_history: None,
        }
    }

    pub fn with_history(order: Order, history: Vec<StatusHistoryEntry>) -> Self {
        let mut view = Self::new(order);
        view.status_history = Some(history);
        view
    }
}

/// Create order payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub from_warehouse_id: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub to_address: String,
    pub to_latitude: Option<f64>,
    pub to_longitude: Option<f64>,
    pub preferred_date: NaiveDate,
    #[validate(length(max = 20))]
    pub preferred_time_from: Option<String>,
    #[validate(length(max = 20))]
    pub preferred_time_to: Option<String>,
    #[validate(length(max = 50))]
    pub cargo_type: Option<String>,
    #[validate(length(max = 100))]
    pub cargo_volume: Option<String>,
    #[validate(range(min = 0.0))]
    pub cargo_weight: Option<f64>,
    #[validate(range(min = 1))]
    pub cargo_places: Option<i64>,
    #[serde(default)]
    pub pickup_required: bool,
    #[validate(length(max = 500))]
    pub special_conditions: Option<String>,
    #[validate(length(max = 255))]
    pub contact_name: Option<String>,
    #[validate(length(max = 20))]
    pub contact_phone: Option<String>,
    pub response_deadline: Option<DateTime<Utc>>,
    pub price: Option<Decimal>,
    #[validate(length(max = 50))]
    pub payment_type: Option<String>,
}

/// Update order payload — all fields optional, editable only pre-assignment
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub from_warehouse_id: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub to_address: Option<String>,
    pub to_latitude: Option<f64>,
    pub to_longitude: Option<f64>,
    pub preferred_date: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub preferred_time_from: Option<String>,
    #[validate(length(max = 20))]
    pub preferred_time_to: Option<String>,
    #[validate(length(max = 50))]
    pub cargo_type: Option<String>,
    #[validate(length(max = 100))]
    pub cargo_volume: Option<String>,
    #[validate(range(min = 0.0))]
    pub cargo_weight: Option<f64>,
    #[validate(range(min = 1))]
    pub cargo_places: Option<i64>,
    pub pickup_required: Option<bool>,
    #[validate(length(max = 500))]
    pub special_conditions: Option<String>,
    #[validate(length(max = 255))]
    pub contact_name: Option<String>,
    #[validate(length(max = 20))]
    pub contact_phone: Option<String>,
    pub response_deadline: Option<DateTime<Utc>>,
    pub price: Option<Decimal>,
    #[validate(length(max = 50))]
    pub payment_type: Option<String>,
}

impl UpdateOrderRequest {
    /// True if no field is present in the patch
    pub fn is_empty(&self) -> bool {
        self.from_warehouse_id.is_none()
            && self.to_address.is_none()
            && self.to_latitude.is_none()
            && self.to_longitude.is_none()
            && self.preferred_date.is_none()
            && self.preferred_time_from.is_none()
            && self.preferred_time_to.is_none()
            && self.cargo_type.is_none()
            && self.cargo_volume.is_none()
            && self.cargo_weight.is_none()
            && self.cargo_places.is_none()
            && self.pickup_required.is_none()
            && self.special_conditions.is_none()
            && self.contact_name.is_none()
            && self.contact_phone.is_none()
            && self.response_deadline.is_none()
            && self.price.is_none()
            && self.payment_type.is_none()
    }
}

/// Update status payload (driver-side progress reporting)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub comment: Option<String>,
}

/// Query params for the open-pool listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailableQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
}
