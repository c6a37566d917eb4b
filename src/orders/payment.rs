//! Payment kind classifier
//!
//! `payment_type` is free text entered by the client; reporting only needs a
//! coarse cash / non-cash split. The matching rules are business policy, kept
//! as a pure function independent of the state machine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Cash,
    NonCash,
}

impl PaymentKind {
    /// Classify a free-text payment type
    ///
    /// Non-cash markers win over cash markers ("безнал" contains "нал").
    pub fn classify(payment_type: &str) -> PaymentKind {
        let normalized = payment_type.to_lowercase();

        const NON_CASH_MARKERS: [&str; 7] = [
            "безнал", "карт", "счет", "счёт", "перевод", "card", "transfer",
        ];
        if NON_CASH_MARKERS.iter().any(|m| normalized.contains(m)) {
            return PaymentKind::NonCash;
        }

        if normalized.contains("нал") || normalized.contains("cash") {
            return PaymentKind::Cash;
        }

        PaymentKind::NonCash
    }
}
