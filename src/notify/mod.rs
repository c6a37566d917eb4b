//! Notification sink
//!
//! Fire-and-forget intents emitted after a transition commits. Delivery
//! mechanics (SMS / push) live elsewhere; this sink records the intent and
//! never fails the calling operation.

#[derive(Debug, Clone, Default)]
pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Self
    }

    pub fn notify_new_order(&self, order_id: &str) {
        tracing::info!(target: "notify", order_id, "New order published");
    }

    pub fn notify_taken(&self, order_id: &str) {
        tracing::info!(target: "notify", order_id, "Order taken by driver");
    }

    pub fn notify_completed(&self, order_id: &str) {
        tracing::info!(target: "notify", order_id, "Order completed");
    }
}
