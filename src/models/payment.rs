//! Modelo de Payment
//!
//! Un pago es un cargo contra una reserva o un reembolso de un cargo previo
//! (`kind = refund`, `refund_of` apunta al cargo).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{Record, RecordMeta};
use crate::database::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    BankTransfer,
    Cryptocurrency,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    #[default]
    Charge,
    Refund,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Failed,
    Refunded,
    Canceled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Canceled => "canceled",
        }
    }

    /// Estados desde los que ya no se sale
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Failed | PaymentStatus::Refunded | PaymentStatus::Canceled
        )
    }

    /// Cargo cobrado, y por tanto reembolsable
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Confirmed | PaymentStatus::Completed)
    }

    /// `refunded` sólo lo fija el flujo de reembolso
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match (self, next) {
            (PaymentStatus::Pending, PaymentStatus::Confirmed)
            | (PaymentStatus::Pending, PaymentStatus::Failed)
            | (PaymentStatus::Pending, PaymentStatus::Canceled)
            | (PaymentStatus::Confirmed, PaymentStatus::Completed)
            | (PaymentStatus::Confirmed, PaymentStatus::Canceled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: u64,
    pub booking_id: u64,
    pub method: PaymentMethod,
    #[serde(default)]
    pub kind: PaymentKind,
    pub amount: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub transaction_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_of: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Payment {
    pub fn is_refund(&self) -> bool {
        self.kind == PaymentKind::Refund
    }

    /// Reembolso ya efectuado, cuenta para los importes pendientes
    pub fn is_completed_refund(&self) -> bool {
        self.is_refund() && self.payment_status == PaymentStatus::Completed
    }
}

impl Record for Payment {
    const TABLE: Table = Table::Payments;
    const RESOURCE: &'static str = "Payment";

    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Confirmed));
        assert!(PaymentStatus::Confirmed.can_transition_to(PaymentStatus::Completed));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Pending));
        assert!(PaymentStatus::Canceled.is_terminal());
        assert!(PaymentStatus::Completed.is_settled());
    }

    #[test]
    fn test_method_wire_format() {
        let method: PaymentMethod = serde_json::from_str("\"bank_transfer\"").unwrap();
        assert_eq!(method, PaymentMethod::BankTransfer);
        assert_eq!(serde_json::to_string(&PaymentMethod::CreditCard).unwrap(), "\"credit_card\"");
    }
}
