use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Payment, PaymentKind, PaymentMethod, PaymentStatus};

// Request para registrar un cargo
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub booking_id: u64,
    pub method: PaymentMethod,
    #[validate(range(min = 0.01))]
    pub amount: f64,
    pub transaction_date: Option<DateTime<Utc>>,
}

// Request para actualizar un cargo pendiente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaymentRequest {
    pub method: Option<PaymentMethod>,
    #[validate(range(min = 0.01))]
    pub amount: Option<f64>,
    pub transaction_date: Option<DateTime<Utc>>,
}

// Request para cambiar el estado del pago
#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

// Request de reembolso; sin importe se reembolsa todo lo pendiente
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RefundRequest {
    #[validate(range(min = 0.01))]
    pub amount: Option<f64>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

// Filtros del listado de pagos
#[derive(Debug, Default, Deserialize)]
pub struct PaymentListQuery {
    pub payment_status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub kind: Option<PaymentKind>,
    pub booking_id: Option<u64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub include_inactive: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// Rango de fechas del resumen
#[derive(Debug, Default, Deserialize)]
pub struct PaymentSummaryQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

// Query de pagos por reserva
#[derive(Debug, Default, Deserialize)]
pub struct BookingPaymentsQuery {
    /// Más recientes primero
    pub sort_by_date: Option<bool>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct AmountBreakdown {
    pub count: usize,
    pub amount: f64,
}

// Resumen de pagos
#[derive(Debug, Serialize)]
pub struct PaymentSummary {
    pub total_payments: usize,
    pub total_charged: f64,
    pub total_refunded: f64,
    pub net_amount: f64,
    pub average_charge: f64,
    pub by_method: BTreeMap<String, AmountBreakdown>,
    pub by_status: BTreeMap<String, AmountBreakdown>,
    pub earliest_transaction: Option<DateTime<Utc>>,
    pub latest_transaction: Option<DateTime<Utc>>,
}

// Resultado de un reembolso
#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub charge: Payment,
    pub refund: Payment,
    pub remaining_refundable: f64,
}
