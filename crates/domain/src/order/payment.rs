//! Payment record and payment-status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the customer pays. Payment itself is simulated; the status field is
/// driven by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    BankTransfer,
}

/// The state of a payment.
///
/// Transitions are externally driven, but restricted:
/// ```text
/// pending ───┬──► processing ──┬──► completed ──► refunded
///            │                 │
///            └─────────────────┴──► failed
/// ```
/// Re-applying the current status is allowed so that a redelivered
/// payment notification stays harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Returns true if the state machine permits moving to `next`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;

        if *self == next {
            return true;
        }

        matches!(
            (self, next),
            (Pending, Processing | Completed | Failed)
                | (Processing, Completed | Failed)
                | (Completed, Refunded)
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Failed | PaymentStatus::Refunded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "processing" => Ok(PaymentStatus::Processing),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Payment details stored on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
}

/// Payment intent supplied by the caller when placing an order.
///
/// An explicit `status` overrides the default of `pending`; anything
/// outside the enumerated set is rejected at the serialization boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
}

impl PaymentIntent {
    /// Creates an intent with the default pending status.
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            status: None,
            card_last4: None,
        }
    }

    /// Creates an intent carrying an explicit status.
    pub fn with_status(method: PaymentMethod, status: PaymentStatus) -> Self {
        Self {
            method,
            status: Some(status),
            card_last4: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PaymentStatus::*;

    #[test]
    fn pending_can_reach_processing_completed_failed() {
        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Refunded));
    }

    #[test]
    fn processing_can_reach_completed_or_failed() {
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Processing.can_transition_to(Refunded));
    }

    #[test]
    fn completed_only_refundable() {
        assert!(Completed.can_transition_to(Refunded));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Completed.can_transition_to(Failed));
    }

    #[test]
    fn terminal_states_allow_nothing_new() {
        for next in [Pending, Processing, Completed] {
            assert!(!Failed.can_transition_to(next));
            assert!(!Refunded.can_transition_to(next));
        }
        assert!(!Refunded.can_transition_to(Completed));
    }

    #[test]
    fn same_status_is_always_allowed() {
        for status in [Pending, Processing, Completed, Failed, Refunded] {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn terminal_states() {
        assert!(Failed.is_terminal());
        assert!(Refunded.is_terminal());
        assert!(!Completed.is_terminal());
    }

    #[test]
    fn status_parses_enumerated_values_only() {
        assert_eq!("completed".parse::<PaymentStatus>(), Ok(Completed));
        assert!("paid".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn status_json_rejects_unknown_values() {
        assert!(serde_json::from_str::<PaymentStatus>("\"settled\"").is_err());
    }

    #[test]
    fn default_status_is_pending() {
        assert_eq!(PaymentStatus::default(), Pending);
    }
}
