use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::database::JsonStore;
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::dto::payment_dto::{
    AmountBreakdown, BookingPaymentsQuery, CreatePaymentRequest, PaymentListQuery,
    PaymentStatusRequest, PaymentSummary, PaymentSummaryQuery, RefundRequest, RefundResponse,
    UpdatePaymentRequest,
};
use crate::models::{Booking, Payment, PaymentKind, PaymentStatus, RecordMeta};
use crate::repositories::{BookingRepository, PaymentRepository};
use crate::services::cascade::CascadeService;
use crate::services::lifecycle::Transition;
use crate::services::query::{
    self, FilterOperator, ListParams, ListQuery, Page, SortOrder, Sorting,
};
use crate::services::validator::{
    amounts_match, check_charge_confirmation, check_refund_amount, refundable_amount,
    require_reference, round_cents, Violations,
};
use crate::utils::errors::{bad_request_error, invalid_transition_error, not_found_error, AppError};
use crate::utils::validation::validate_money;

const SORTING: Sorting = Sorting::new(&["id", "amount", "transaction_date", "created_at"])
    .by_default("transaction_date", SortOrder::Desc);

pub struct PaymentController {
    store: Arc<JsonStore>,
    repository: PaymentRepository,
}

impl PaymentController {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            repository: PaymentRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, params: PaymentListQuery) -> Result<Page<Payment>, AppError> {
        if let (Some(from), Some(to)) = (params.date_from, params.date_to) {
            if from > to {
                return Err(bad_request_error("date_from cannot be later than date_to"));
            }
        }
        if let (Some(min), Some(max)) = (params.min_amount, params.max_amount) {
            if min > max {
                return Err(bad_request_error("min_amount cannot be greater than max_amount"));
            }
        }

        let query = ListQuery::from_params(
            ListParams {
                limit: params.limit,
                offset: params.offset,
                include_inactive: params.include_inactive,
                sort_by: params.sort_by.as_deref(),
                sort_order: params.sort_order.as_deref(),
            },
            &SORTING,
        )?
        .filter_opt(
            "payment_status",
            "payment_status",
            FilterOperator::Eq,
            params.payment_status.map(|s| s.as_str()),
        )
        .filter_opt(
            "method",
            "method",
            FilterOperator::Eq,
            params.method.map(serde_json::to_value).transpose()?,
        )
        .filter_opt(
            "kind",
            "kind",
            FilterOperator::Eq,
            params.kind.map(serde_json::to_value).transpose()?,
        )
        .filter_opt("booking_id", "booking_id", FilterOperator::Eq, params.booking_id)
        .filter_opt("min_amount", "amount", FilterOperator::Gte, params.min_amount)
        .filter_opt("max_amount", "amount", FilterOperator::Lte, params.max_amount)
        .filter_opt(
            "date_from",
            "transaction_date",
            FilterOperator::Gte,
            params.date_from.map(|d| d.to_string()),
        )
        .filter_opt(
            "date_to",
            "transaction_date",
            FilterOperator::Lte,
            params.date_to.map(|d| d.to_string()),
        );

        let payments = self.repository.load().await?;
        query::run(payments, &query)
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Payment, AppError> {
        self.repository.get(id).await
    }

    pub async fn by_booking(
        &self,
        booking_id: u64,
        params: BookingPaymentsQuery,
    ) -> Result<Vec<Payment>, AppError> {
        BookingRepository::new(self.store.clone()).get(booking_id).await?;

        let mut payments = self.repository.find_by_booking(booking_id).await?;
        if params.sort_by_date.unwrap_or(false) {
            payments.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        }
        if payments.is_empty() {
            tracing::debug!("Reserva {} sin pagos registrados", booking_id);
        }
        Ok(payments)
    }

    /// Registrar un cargo pendiente contra una reserva
    pub async fn create(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<ApiResponse<Payment>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());
        violations.check("amount", validate_money(request.amount));

        let _guard = self.store.write_guard().await;
        let bookings = BookingRepository::new(self.store.clone()).load().await?;
        require_reference::<Booking>(&bookings, request.booking_id, "booking_id", &mut violations);
        violations.into_result()?;

        let payment = self
            .repository
            .insert(Payment {
                id: 0,
                booking_id: request.booking_id,
                method: request.method,
                kind: PaymentKind::Charge,
                amount: request.amount,
                payment_status: PaymentStatus::Pending,
                transaction_date: request.transaction_date.unwrap_or_else(Utc::now),
                refund_of: None,
                reason: None,
                meta: RecordMeta::new(),
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            payment,
            "Payment created successfully".to_string(),
        ))
    }

    /// Sólo los cargos pendientes se pueden editar
    pub async fn update(
        &self,
        id: u64,
        request: UpdatePaymentRequest,
    ) -> Result<ApiResponse<Payment>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());
        if let Some(amount) = request.amount {
            violations.check("amount", validate_money(amount));
        }
        violations.into_result()?;

        let _guard = self.store.write_guard().await;
        let mut payment = self.repository.get(id).await?;

        if payment.kind != PaymentKind::Charge || payment.payment_status != PaymentStatus::Pending {
            return Err(invalid_transition_error(
                "Payment",
                id,
                &format!("only pending charges can be edited (status '{}')", payment.payment_status),
            ));
        }

        if let Some(method) = request.method {
            payment.method = method;
        }
        if let Some(amount) = request.amount {
            payment.amount = amount;
        }
        if let Some(transaction_date) = request.transaction_date {
            payment.transaction_date = transaction_date;
        }
        payment.meta.touch();

        let payment = self.repository.replace(payment).await?;
        Ok(ApiResponse::success_with_message(
            payment,
            "Payment updated successfully".to_string(),
        ))
    }

    pub async fn update_status(
        &self,
        id: u64,
        request: PaymentStatusRequest,
    ) -> Result<ApiResponse<Payment>, AppError> {
        if request.payment_status == PaymentStatus::Confirmed {
            return self.confirm(id).await;
        }

        let _guard = self.store.write_guard().await;
        let mut payment = self.repository.get(id).await?;
        let next = request.payment_status;

        if payment.is_refund() || !payment.payment_status.can_transition_to(next) {
            let reason = if payment.payment_status.is_terminal() {
                format!("status '{}' is final", payment.payment_status)
            } else {
                format!("cannot move from '{}' to '{}'", payment.payment_status, next)
            };
            return Err(invalid_transition_error("Payment", id, &reason));
        }

        payment.payment_status = next;
        payment.meta.touch();
        let payment = self.repository.replace(payment).await?;

        tracing::info!("💳 Pago {} pasa a '{}'", id, next);
        Ok(ApiResponse::success_with_message(
            payment,
            "Payment status updated".to_string(),
        ))
    }

    /// Confirmar un cargo: el importe debe cuadrar con lo que se debe de la reserva
    pub async fn confirm(&self, id: u64) -> Result<ApiResponse<Payment>, AppError> {
        let _guard = self.store.write_guard().await;
        let payments = self.repository.load().await?;
        let mut payment = payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("Payment", id))?;

        if payment.is_refund() {
            return Err(invalid_transition_error("Payment", id, "refunds cannot be confirmed"));
        }
        match payment.payment_status {
            PaymentStatus::Pending => {}
            PaymentStatus::Confirmed => {
                return Err(invalid_transition_error("Payment", id, "payment is already confirmed"));
            }
            other => {
                return Err(invalid_transition_error(
                    "Payment",
                    id,
                    &format!("cannot confirm payment in '{}' status", other),
                ));
            }
        }

        let mut violations = Violations::new();
        let bookings = BookingRepository::new(self.store.clone()).load().await?;
        if let Some(booking) =
            require_reference::<Booking>(&bookings, payment.booking_id, "booking_id", &mut violations)
        {
            check_charge_confirmation(&payment, &booking, &payments, &mut violations);
        }
        violations.into_result()?;

        let now = Utc::now();
        payment.payment_status = PaymentStatus::Confirmed;
        payment.transaction_date = now;
        payment.meta.updated_at = now;

        let payment = self.repository.replace(payment).await?;
        tracing::info!("✅ Pago {} confirmado ({:.2})", id, payment.amount);
        Ok(ApiResponse::success_with_message(
            payment,
            "Payment confirmed".to_string(),
        ))
    }

    /// Reembolsar total o parcialmente un cargo cobrado
    pub async fn refund(
        &self,
        id: u64,
        request: RefundRequest,
    ) -> Result<ApiResponse<RefundResponse>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());
        violations.into_result()?;

        let _guard = self.store.write_guard().await;
        let payments = self.repository.load().await?;
        let mut charge = payments
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("Payment", id))?;

        if charge.is_refund() {
            return Err(invalid_transition_error("Payment", id, "a refund cannot be refunded"));
        }
        if !charge.payment_status.is_settled() {
            return Err(invalid_transition_error(
                "Payment",
                id,
                &format!("only confirmed or completed charges can be refunded (status '{}')", charge.payment_status),
            ));
        }

        let available = refundable_amount(&charge, &payments);
        if available <= 0.0 {
            return Err(invalid_transition_error("Payment", id, "payment is already fully refunded"));
        }

        let amount = request.amount.unwrap_or(available);
        let mut violations = Violations::new();
        violations.check("amount", validate_money(amount));
        check_refund_amount(&charge, amount, &payments, &mut violations);
        violations.into_result()?;

        let now = Utc::now();
        let refund = self
            .repository
            .insert(Payment {
                id: 0,
                booking_id: charge.booking_id,
                method: charge.method,
                kind: PaymentKind::Refund,
                amount,
                payment_status: PaymentStatus::Completed,
                transaction_date: now,
                refund_of: Some(charge.id),
                reason: request.reason,
                meta: RecordMeta::new(),
            })
            .await?;

        let remaining = round_cents(available - amount);
        if amounts_match(remaining, 0.0) {
            charge.payment_status = PaymentStatus::Refunded;
            charge.meta.updated_at = now;
            charge = self.repository.replace(charge).await?;
        }

        tracing::info!(
            "↩️  Reembolso {} de {:.2} sobre el pago {} (pendiente {:.2})",
            refund.id,
            amount,
            id,
            remaining.max(0.0)
        );
        Ok(ApiResponse::success_with_message(
            RefundResponse {
                charge,
                refund,
                remaining_refundable: remaining.max(0.0),
            },
            "Refund processed".to_string(),
        ))
    }

    pub async fn delete(
        &self,
        id: u64,
        params: DeleteParams,
    ) -> Result<ApiResponse<DeleteOutcome>, AppError> {
        let _guard = self.store.write_guard().await;

        if params.is_hard() {
            let cascade = CascadeService::new(self.store.clone()).delete_payment(id).await?;
            return Ok(ApiResponse::success_with_message(
                DeleteOutcome::Hard { id, cascade },
                "Payment permanently deleted".to_string(),
            ));
        }

        let (payment, transition) = self.repository.soft_delete(id).await?;
        Ok(ApiResponse::success_with_message(
            DeleteOutcome::Soft {
                id,
                status: payment.meta.status,
                changed: transition == Transition::Applied,
            },
            "Payment deactivated".to_string(),
        ))
    }

    pub async fn reactivate(&self, id: u64) -> Result<ApiResponse<Payment>, AppError> {
        let _guard = self.store.write_guard().await;
        let payment = self.repository.reactivate(id).await?;
        Ok(ApiResponse::success_with_message(
            payment,
            "Payment reactivated".to_string(),
        ))
    }

    pub async fn summary(&self, params: PaymentSummaryQuery) -> Result<PaymentSummary, AppError> {
        if let (Some(from), Some(to)) = (params.date_from, params.date_to) {
            if from > to {
                return Err(bad_request_error("date_from cannot be later than date_to"));
            }
        }

        let payments: Vec<Payment> = self
            .repository
            .load()
            .await?
            .into_iter()
            .filter(|p| p.meta.is_active())
            .filter(|p| {
                let day = p.transaction_date.date_naive();
                params.date_from.map_or(true, |from| day >= from)
                    && params.date_to.map_or(true, |to| day <= to)
            })
            .collect();

        Ok(summarize(&payments))
    }
}

fn summarize(payments: &[Payment]) -> PaymentSummary {
    let mut by_method: BTreeMap<String, AmountBreakdown> = BTreeMap::new();
    let mut by_status: BTreeMap<String, AmountBreakdown> = BTreeMap::new();
    let mut total_charged = 0.0;
    let mut total_refunded = 0.0;
    let mut charge_amounts = Vec::new();

    for payment in payments {
        let method = serde_json::to_value(payment.method)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let method_entry = by_method.entry(method).or_default();
        method_entry.count += 1;
        method_entry.amount = round_cents(method_entry.amount + payment.amount);

        let status_entry = by_status.entry(payment.payment_status.to_string()).or_default();
        status_entry.count += 1;
        status_entry.amount = round_cents(status_entry.amount + payment.amount);

        match payment.kind {
            PaymentKind::Charge => {
                charge_amounts.push(payment.amount);
                if payment.payment_status.is_settled() || payment.payment_status == PaymentStatus::Refunded {
                    total_charged += payment.amount;
                }
            }
            PaymentKind::Refund => {
                if payment.is_completed_refund() {
                    total_refunded += payment.amount;
                }
            }
        }
    }

    let average_charge = if charge_amounts.is_empty() {
        0.0
    } else {
        round_cents(charge_amounts.iter().sum::<f64>() / charge_amounts.len() as f64)
    };

    PaymentSummary {
        total_payments: payments.len(),
        total_charged: round_cents(total_charged),
        total_refunded: round_cents(total_refunded),
        net_amount: round_cents(total_charged - total_refunded),
        average_charge,
        by_method,
        by_status,
        earliest_transaction: payments.iter().map(|p| p.transaction_date).min(),
        latest_transaction: payments.iter().map(|p| p.transaction_date).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;

    fn payment(kind: PaymentKind, amount: f64, status: PaymentStatus, method: PaymentMethod) -> Payment {
        Payment {
            id: 1,
            booking_id: 1,
            method,
            kind,
            amount,
            payment_status: status,
            transaction_date: Utc::now(),
            refund_of: None,
            reason: None,
            meta: RecordMeta::new(),
        }
    }

    #[test]
    fn test_summarize() {
        let payments = vec![
            payment(PaymentKind::Charge, 500.0, PaymentStatus::Refunded, PaymentMethod::CreditCard),
            payment(PaymentKind::Refund, 500.0, PaymentStatus::Completed, PaymentMethod::CreditCard),
            payment(PaymentKind::Charge, 120.5, PaymentStatus::Confirmed, PaymentMethod::Paypal),
            payment(PaymentKind::Charge, 80.0, PaymentStatus::Pending, PaymentMethod::Paypal),
        ];

        let summary = summarize(&payments);
        assert_eq!(summary.total_payments, 4);
        assert_eq!(summary.total_charged, 620.5);
        assert_eq!(summary.total_refunded, 500.0);
        assert_eq!(summary.net_amount, 120.5);
        assert_eq!(summary.average_charge, 233.5);
        assert_eq!(summary.by_method["paypal"].count, 2);
        assert_eq!(summary.by_method["credit_card"].amount, 1000.0);
        assert_eq!(summary.by_status["pending"].count, 1);
    }
}
