use std::collections::BTreeMap;
use std::sync::Arc;

use validator::Validate;

use crate::database::JsonStore;
use crate::dto::booking_dto::{
    BookingListQuery, BookingStats, BookingStatusRequest, BookingSummary, CreateBookingRequest,
    UpdateBookingRequest,
};
use crate::dto::common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
use crate::models::{
    Booking, BookingStatus, Customer, Destination, PaymentKind, PaymentStatus, RecordMeta,
};
use crate::repositories::{
    BookingRepository, CustomerRepository, DestinationRepository, PaymentRepository,
};
use crate::services::cascade::CascadeService;
use crate::services::lifecycle::Transition;
use crate::services::query::{self, FilterOperator, ListParams, ListQuery, Page, Sorting};
use crate::services::validator::{check_booking_dates, require_reference, round_cents, Violations};
use crate::utils::errors::{invalid_transition_error, AppError};
use crate::utils::validation::validate_money;

const SORTING: Sorting = Sorting::new(&[
    "id",
    "start_date",
    "end_date",
    "total_amount",
    "travelers",
    "created_at",
]);

pub struct BookingController {
    store: Arc<JsonStore>,
    repository: BookingRepository,
}

impl BookingController {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            repository: BookingRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, params: BookingListQuery) -> Result<Page<Booking>, AppError> {
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
            "booking_status",
            "booking_status",
            FilterOperator::Eq,
            params.booking_status.map(|s| s.as_str()),
        )
        .filter_opt("customer_id", "customer_id", FilterOperator::Eq, params.customer_id)
        .filter_opt("destination_id", "destination_id", FilterOperator::Eq, params.destination_id)
        .filter_opt(
            "start_from",
            "start_date",
            FilterOperator::Gte,
            params.start_from.map(|d| d.to_string()),
        )
        .filter_opt(
            "start_to",
            "start_date",
            FilterOperator::Lte,
            params.start_to.map(|d| d.to_string()),
        );

        let bookings = self.repository.load().await?;
        query::run(bookings, &query)
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Booking, AppError> {
        self.repository.get(id).await
    }

    pub async fn create(
        &self,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let customers = CustomerRepository::new(self.store.clone()).load().await?;
        let destinations = DestinationRepository::new(self.store.clone()).load().await?;

        require_reference::<Customer>(&customers, request.customer_id, "customer_id", &mut violations);
        let destination = require_reference::<Destination>(
            &destinations,
            request.destination_id,
            "destination_id",
            &mut violations,
        );
        check_booking_dates(request.start_date, request.end_date, &mut violations);

        let travelers = request.travelers.unwrap_or(1);
        let total_amount = match (request.total_amount, &destination) {
            (Some(amount), _) => {
                violations.check("total_amount", validate_money(amount));
                amount
            }
            (None, Some(destination)) => round_cents(destination.price * f64::from(travelers)),
            (None, None) => 0.0,
        };
        violations.into_result()?;

        let booking = self
            .repository
            .insert(Booking {
                id: 0,
                customer_id: request.customer_id,
                destination_id: Some(request.destination_id),
                start_date: request.start_date,
                end_date: request.end_date,
                travelers,
                total_amount,
                booking_status: BookingStatus::Pending,
                meta: RecordMeta::new(),
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            booking,
            "Booking created successfully".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: u64,
        request: UpdateBookingRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        let mut violations = Violations::new();
        violations.extend(request.validate());

        let _guard = self.store.write_guard().await;
        let mut booking = self.repository.get(id).await?;
        let destinations = DestinationRepository::new(self.store.clone()).load().await?;

        if let Some(destination_id) = request.destination_id {
            require_reference::<Destination>(&destinations, destination_id, "destination_id", &mut violations);
            booking.destination_id = Some(destination_id);
        }
        if let Some(start_date) = request.start_date {
            booking.start_date = Some(start_date);
        }
        if let Some(end_date) = request.end_date {
            booking.end_date = Some(end_date);
        }
        check_booking_dates(booking.start_date, booking.end_date, &mut violations);

        if let Some(travelers) = request.travelers {
            booking.travelers = travelers;
        }
        match request.total_amount {
            Some(amount) => {
                violations.check("total_amount", validate_money(amount));
                booking.total_amount = amount;
            }
            None if request.travelers.is_some() || request.destination_id.is_some() => {
                // el importe sigue al precio del destino
                if let Some(destination) = booking
                    .destination_id
                    .and_then(|d| destinations.iter().find(|x| x.id == d))
                {
                    booking.total_amount = round_cents(destination.price * f64::from(booking.travelers));
                }
            }
            None => {}
        }
        violations.into_result()?;

        if let Some(next) = request.booking_status {
            apply_status(&mut booking, next)?;
        }
        booking.meta.touch();

        let booking = self.repository.replace(booking).await?;
        Ok(ApiResponse::success_with_message(
            booking,
            "Booking updated successfully".to_string(),
        ))
    }

    pub async fn update_status(
        &self,
        id: u64,
        request: BookingStatusRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        let _guard = self.store.write_guard().await;
        let mut booking = self.repository.get(id).await?;
        apply_status(&mut booking, request.booking_status)?;
        booking.meta.touch();

        let booking = self.repository.replace(booking).await?;
        tracing::info!("📋 Reserva {} pasa a '{}'", id, booking.booking_status);
        Ok(ApiResponse::success_with_message(
            booking,
            "Booking status updated".to_string(),
        ))
    }

    pub async fn delete(
        &self,
        id: u64,
        params: DeleteParams,
    ) -> Result<ApiResponse<DeleteOutcome>, AppError> {
        let _guard = self.store.write_guard().await;

        if params.is_hard() {
            let cascade = CascadeService::new(self.store.clone()).delete_booking(id).await?;
            return Ok(ApiResponse::success_with_message(
                DeleteOutcome::Hard { id, cascade },
                "Booking permanently deleted".to_string(),
            ));
        }

        let (booking, transition) = self.repository.soft_delete(id).await?;
        Ok(ApiResponse::success_with_message(
            DeleteOutcome::Soft {
                id,
                status: booking.meta.status,
                changed: transition == Transition::Applied,
            },
            "Booking deactivated".to_string(),
        ))
    }

    pub async fn reactivate(&self, id: u64) -> Result<ApiResponse<Booking>, AppError> {
        let _guard = self.store.write_guard().await;
        let booking = self.repository.reactivate(id).await?;
        Ok(ApiResponse::success_with_message(
            booking,
            "Booking reactivated".to_string(),
        ))
    }

    /// Estadísticas sobre las reservas activas
    pub async fn stats(&self) -> Result<BookingStats, AppError> {
        let bookings: Vec<Booking> = self
            .repository
            .load()
            .await?
            .into_iter()
            .filter(|b| b.meta.is_active())
            .collect();

        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        for booking in &bookings {
            *by_status.entry(booking.booking_status.to_string()).or_default() += 1;
        }

        let durations: Vec<i64> = bookings
            .iter()
            .filter_map(Booking::duration_days)
            .filter(|d| *d >= 0)
            .collect();

        let confirmed_revenue: f64 = bookings
            .iter()
            .filter(|b| {
                matches!(b.booking_status, BookingStatus::Confirmed | BookingStatus::Completed)
            })
            .map(|b| b.total_amount)
            .sum();

        Ok(BookingStats {
            total_bookings: bookings.len(),
            bookings_by_status: by_status,
            average_duration_days: average(durations.iter().map(|d| *d as f64)),
            average_travelers: average(bookings.iter().map(|b| f64::from(b.travelers))),
            confirmed_revenue: round_cents(confirmed_revenue),
        })
    }

    pub async fn summary(&self, id: u64) -> Result<BookingSummary, AppError> {
        let booking = self.repository.get(id).await?;
        let customer = CustomerRepository::new(self.store.clone())
            .find_by_id(booking.customer_id)
            .await?;
        let destination = match booking.destination_id {
            Some(destination_id) => {
                DestinationRepository::new(self.store.clone())
                    .find_by_id(destination_id)
                    .await?
            }
            None => None,
        };
        let payments = PaymentRepository::new(self.store.clone())
            .find_by_booking(id)
            .await?;

        let amount_paid: f64 = payments
            .iter()
            .map(|p| match p.kind {
                // un cargo reembolsado se cobró; sus reembolsos lo compensan
                PaymentKind::Charge
                    if p.payment_status.is_settled()
                        || p.payment_status == PaymentStatus::Refunded =>
                {
                    p.amount
                }
                PaymentKind::Refund if p.is_completed_refund() => -p.amount,
                _ => 0.0,
            })
            .sum();
        let amount_paid = round_cents(amount_paid);

        Ok(BookingSummary {
            id: booking.id,
            customer,
            destination,
            start_date: booking.start_date,
            end_date: booking.end_date,
            duration_days: booking.duration_days(),
            travelers: booking.travelers,
            booking_status: booking.booking_status,
            total_amount: booking.total_amount,
            amount_paid,
            balance_due: round_cents(booking.total_amount - amount_paid),
            payments,
        })
    }
}

fn apply_status(booking: &mut Booking, next: BookingStatus) -> Result<(), AppError> {
    if booking.booking_status == next {
        return Ok(());
    }
    if !booking.booking_status.can_transition_to(next) {
        return Err(invalid_transition_error(
            "Booking",
            booking.id,
            &format!("cannot move from '{}' to '{}'", booking.booking_status, next),
        ));
    }
    booking.booking_status = next;
    Ok(())
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        round_cents(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_status() {
        let mut booking = Booking {
            id: 1,
            customer_id: 1,
            destination_id: None,
            start_date: None,
            end_date: None,
            travelers: 1,
            total_amount: 10.0,
            booking_status: BookingStatus::Pending,
            meta: RecordMeta::new(),
        };

        apply_status(&mut booking, BookingStatus::Confirmed).unwrap();
        apply_status(&mut booking, BookingStatus::Confirmed).unwrap();
        assert!(matches!(
            apply_status(&mut booking, BookingStatus::Pending),
            Err(AppError::InvalidTransition(_))
        ));
        apply_status(&mut booking, BookingStatus::Completed).unwrap();
        assert_eq!(booking.booking_status, BookingStatus::Completed);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(std::iter::empty()), 0.0);
        assert_eq!(average([2.0, 3.0, 3.0].into_iter()), 2.67);
    }
}
