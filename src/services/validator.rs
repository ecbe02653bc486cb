//! Reglas de validación entre registros
//!
//! Las comprobaciones de formato van en los DTOs (`validator` derive). Aquí
//! viven las reglas que necesitan el estado de otras tablas: referencias,
//! unicidad, solapes de horarios e importes de pagos.

use std::borrow::Cow;

use chrono::NaiveDate;
use ::validator::{ValidationError, ValidationErrors};

use crate::models::{Booking, Payment, Record, Schedule, Vehicle};
use crate::models::staff::is_guide_role;
use crate::utils::errors::{conflict_error, AppError, AppResult};

/// Tolerancia absoluta al comparar importes
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Acumulador de errores de campo
#[derive(Debug, Default)]
pub struct Violations {
    errors: ValidationErrors,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        let mut error = ValidationError::new(code);
        error.message = Some(Cow::Owned(message.into()));
        self.errors.add(field, error);
    }

    /// Registrar un error ya construido por los helpers de `utils::validation`
    pub fn push(&mut self, field: &'static str, error: ValidationError) {
        self.errors.add(field, error);
    }

    pub fn check(&mut self, field: &'static str, result: Result<(), ValidationError>) {
        if let Err(error) = result {
            self.push(field, error);
        }
    }

    /// Incorporar los errores de `Validate::validate`
    pub fn extend(&mut self, result: Result<(), ValidationErrors>) {
        if let Err(errors) = result {
            for (field, list) in errors.field_errors() {
                for error in list {
                    self.errors.add(field, error.clone());
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.errors().is_empty()
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// La referencia debe apuntar a un registro existente (activo o no)
pub fn require_reference<T: Record>(
    records: &[T],
    id: u64,
    field: &'static str,
    violations: &mut Violations,
) -> Option<T> {
    let found = records.iter().find(|r| r.id() == id).cloned();
    if found.is_none() {
        violations.add(
            field,
            "reference",
            format!("{} with id '{}' does not exist", T::RESOURCE, id),
        );
    }
    found
}

/// Unicidad sin distinguir mayúsculas sobre un campo de texto
pub fn ensure_unique<T: Record>(
    records: &[T],
    exclude_id: Option<u64>,
    field: &str,
    candidate: &str,
    extract: impl Fn(&T) -> Option<&str>,
) -> AppResult<()> {
    let candidate_lower = candidate.trim().to_lowercase();
    let taken = records
        .iter()
        .filter(|r| Some(r.id()) != exclude_id)
        .filter_map(|r| extract(r))
        .any(|value| value.trim().to_lowercase() == candidate_lower);

    if taken {
        return Err(conflict_error(T::RESOURCE, field, candidate));
    }
    Ok(())
}

pub fn check_booking_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    violations: &mut Violations,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            violations.add("end_date", "date_order", "end_date must not be before start_date");
        }
    }
}

/// Ventana temporal, capacidad y coherencia vehículo/destino de un horario
pub fn check_schedule(
    schedule: &Schedule,
    vehicle: Option<&Vehicle>,
    violations: &mut Violations,
) {
    if schedule.destination_id.is_none() && schedule.vehicle_id.is_none() {
        violations.add(
            "vehicle_id",
            "required",
            "a schedule needs a vehicle_id, a destination_id or both",
        );
    }

    if schedule.ends_at <= schedule.starts_at {
        violations.add("ends_at", "time_window", "ends_at must be after starts_at");
    }

    if schedule.capacity == 0 {
        violations.add("capacity", "positive", "capacity must be at least 1");
    }

    if let Some(vehicle) = vehicle {
        if schedule.capacity > vehicle.capacity {
            violations.add(
                "capacity",
                "vehicle_capacity",
                format!(
                    "capacity {} exceeds the capacity of vehicle {} ({})",
                    schedule.capacity, vehicle.id, vehicle.capacity
                ),
            );
        }

        if let Some(destination_id) = schedule.destination_id {
            if !vehicle.serves(destination_id) {
                violations.add(
                    "destination_id",
                    "vehicle_destination",
                    format!(
                        "vehicle {} is not assigned to destination {}",
                        vehicle.id, destination_id
                    ),
                );
            }
        }
    }
}

/// Un vehículo modificado tiene que seguir cubriendo sus horarios activos
pub fn check_vehicle_schedules(
    vehicle: &Vehicle,
    schedules: &[Schedule],
    violations: &mut Violations,
) {
    let assigned = schedules
        .iter()
        .filter(|s| s.vehicle_id == Some(vehicle.id) && s.is_active());

    for schedule in assigned {
        if schedule.capacity > vehicle.capacity {
            violations.add(
                "capacity",
                "schedule_capacity",
                format!(
                    "capacity {} is below the capacity of active schedule {} ({})",
                    vehicle.capacity, schedule.id, schedule.capacity
                ),
            );
        }

        if let Some(destination_id) = schedule.destination_id {
            if !vehicle.serves(destination_id) {
                violations.add(
                    "destination_ids",
                    "schedule_destination",
                    format!(
                        "destination {} is still used by active schedule {}",
                        destination_id, schedule.id
                    ),
                );
            }
        }
    }
}

/// Primer horario activo que comparte recurso y se solapa con el candidato.
///
/// El recurso es el vehículo; sin vehículo, el destino entre los horarios
/// que tampoco tienen vehículo.
pub fn find_overlap<'a>(schedules: &'a [Schedule], candidate: &Schedule) -> Option<&'a Schedule> {
    schedules
        .iter()
        .filter(|s| s.id != candidate.id && s.is_active())
        .filter(|s| match candidate.vehicle_id {
            Some(vehicle_id) => s.vehicle_id == Some(vehicle_id),
            None => s.vehicle_id.is_none() && s.destination_id == candidate.destination_id,
        })
        .find(|s| s.overlaps(candidate.starts_at, candidate.ends_at))
}

pub fn ensure_no_overlap(schedules: &[Schedule], candidate: &Schedule) -> AppResult<()> {
    match find_overlap(schedules, candidate) {
        Some(existing) => Err(AppError::Conflict(format!(
            "Schedule overlaps schedule {} ({} - {})",
            existing.id,
            existing.starts_at.to_rfc3339(),
            existing.ends_at.to_rfc3339()
        ))),
        None => Ok(()),
    }
}

/// Un guía necesita al menos un destino asignado
pub fn check_staff_assignment(role: &str, destination_ids: &[u64], violations: &mut Violations) {
    if is_guide_role(role) && destination_ids.is_empty() {
        violations.add(
            "destination_ids",
            "guide_destination",
            "staff with a guide role must be assigned to at least one destination",
        );
    }
}

/// La reserva relacionada debe ser del mismo cliente que el feedback
pub fn check_booking_owner(booking: &Booking, customer_id: u64, violations: &mut Violations) {
    if booking.customer_id != customer_id {
        violations.add(
            "related_booking_id",
            "booking_owner",
            format!("booking {} does not belong to customer {}", booking.id, customer_id),
        );
    }
}

pub fn amounts_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= AMOUNT_TOLERANCE + f64::EPSILON
}

/// Importe que debe tener un cargo para confirmarse: total de la reserva
/// menos los reembolsos ya completados de esa reserva
pub fn expected_charge_amount(booking: &Booking, payments: &[Payment]) -> f64 {
    let refunded: f64 = payments
        .iter()
        .filter(|p| p.booking_id == booking.id && p.is_completed_refund())
        .map(|p| p.amount)
        .sum();
    round_cents(booking.total_amount - refunded)
}

/// Lo que queda por reembolsar de un cargo
pub fn refundable_amount(charge: &Payment, payments: &[Payment]) -> f64 {
    let refunded: f64 = payments
        .iter()
        .filter(|p| p.refund_of == Some(charge.id) && p.is_completed_refund())
        .map(|p| p.amount)
        .sum();
    round_cents((charge.amount - refunded).max(0.0))
}

pub fn check_charge_confirmation(
    payment: &Payment,
    booking: &Booking,
    payments: &[Payment],
    violations: &mut Violations,
) {
    let expected = expected_charge_amount(booking, payments);
    if !amounts_match(payment.amount, expected) {
        violations.add(
            "amount",
            "amount_mismatch",
            format!(
                "payment amount {:.2} does not match the amount due for booking {} ({:.2})",
                payment.amount, booking.id, expected
            ),
        );
    }
}

pub fn check_refund_amount(
    charge: &Payment,
    amount: f64,
    payments: &[Payment],
    violations: &mut Violations,
) {
    let available = refundable_amount(charge, payments);
    if amount > available + AMOUNT_TOLERANCE / 2.0 {
        violations.add(
            "amount",
            "refund_exceeds",
            format!(
                "refund amount {:.2} exceeds the refundable amount {:.2} of payment {}",
                amount, available, charge.id
            ),
        );
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, Customer, PaymentKind, PaymentMethod, PaymentStatus, RecordMeta, RecordStatus};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn schedule(id: u64, vehicle_id: Option<u64>, destination_id: Option<u64>, from: u32, to: u32) -> Schedule {
        Schedule {
            id,
            destination_id,
            vehicle_id,
            starts_at: at(from),
            ends_at: at(to),
            capacity: 10,
            meta: RecordMeta::new(),
        }
    }

    fn booking(total: f64) -> Booking {
        Booking {
            id: 7,
            customer_id: 1,
            destination_id: Some(1),
            start_date: None,
            end_date: None,
            travelers: 2,
            total_amount: total,
            booking_status: BookingStatus::Pending,
            meta: RecordMeta::new(),
        }
    }

    fn payment(id: u64, kind: PaymentKind, amount: f64, status: PaymentStatus, refund_of: Option<u64>) -> Payment {
        Payment {
            id,
            booking_id: 7,
            method: PaymentMethod::CreditCard,
            kind,
            amount,
            payment_status: status,
            transaction_date: at(9),
            refund_of,
            reason: None,
            meta: RecordMeta::new(),
        }
    }

    #[test]
    fn test_overlap_same_vehicle_only() {
        let mut retired = schedule(3, Some(1), None, 12, 13);
        retired.meta.status = RecordStatus::Inactive;
        let existing = vec![schedule(1, Some(1), None, 10, 11), schedule(2, Some(2), None, 10, 11), retired];

        assert!(ensure_no_overlap(&existing, &schedule(0, Some(1), None, 10, 12)).is_err());
        assert!(ensure_no_overlap(&existing, &schedule(0, Some(1), None, 11, 12)).is_ok());
        assert!(ensure_no_overlap(&existing, &schedule(0, Some(3), None, 10, 11)).is_ok());
        // los horarios inactivos no bloquean
        assert!(ensure_no_overlap(&existing, &schedule(0, Some(1), None, 12, 13)).is_ok());
        // un horario no choca consigo mismo al actualizarse
        assert!(ensure_no_overlap(&existing, &schedule(1, Some(1), None, 10, 11)).is_ok());
    }

    #[test]
    fn test_overlap_by_destination_without_vehicle() {
        let existing = vec![schedule(1, None, Some(5), 10, 11), schedule(2, Some(9), Some(5), 10, 11)];

        assert!(find_overlap(&existing, &schedule(0, None, Some(5), 10, 11)).map(|s| s.id) == Some(1));
        assert!(find_overlap(&existing, &schedule(0, None, Some(6), 10, 11)).is_none());
    }

    #[test]
    fn test_schedule_checks() {
        let vehicle = Vehicle {
            id: 4,
            vehicle_type: "bus".to_string(),
            license_plate: None,
            capacity: 8,
            destination_ids: vec![1],
            meta: RecordMeta::new(),
        };

        let mut violations = Violations::new();
        check_schedule(&schedule(0, Some(4), Some(2), 11, 10), Some(&vehicle), &mut violations);
        let errors = violations.into_result().unwrap_err();
        let AppError::Validation(errors) = errors else { panic!("expected validation error") };
        let fields = errors.field_errors();
        assert!(fields.contains_key("ends_at"));
        assert!(fields.contains_key("capacity"));
        assert!(fields.contains_key("destination_id"));
    }

    #[test]
    fn test_vehicle_must_keep_covering_schedules() {
        let mut vehicle = Vehicle {
            id: 9,
            vehicle_type: "van".to_string(),
            license_plate: None,
            capacity: 10,
            destination_ids: vec![5],
            meta: RecordMeta::new(),
        };
        let mut finished = schedule(2, Some(9), Some(6), 12, 13);
        finished.meta.status = RecordStatus::Inactive;
        let schedules = vec![schedule(1, Some(9), Some(5), 10, 11), finished];

        let mut violations = Violations::new();
        check_vehicle_schedules(&vehicle, &schedules, &mut violations);
        assert!(violations.is_empty());

        vehicle.capacity = 4;
        vehicle.destination_ids = vec![7];
        let mut violations = Violations::new();
        check_vehicle_schedules(&vehicle, &schedules, &mut violations);
        let AppError::Validation(errors) = violations.into_result().unwrap_err() else {
            panic!("expected validation error")
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("capacity"));
        assert!(fields.contains_key("destination_ids"));
    }

    #[test]
    fn test_uniqueness_is_case_insensitive() {
        let customers = vec![Customer {
            id: 1,
            name: "Ana".to_string(),
            email: Some("ana@example.com".to_string()),
            phone: None,
            meta: RecordMeta::new(),
        }];

        let taken = ensure_unique(&customers, None, "email", "ANA@example.com", |c| c.email.as_deref());
        assert!(matches!(taken, Err(AppError::Conflict(_))));

        let own = ensure_unique(&customers, Some(1), "email", "ana@example.com", |c| c.email.as_deref());
        assert!(own.is_ok());
    }

    #[test]
    fn test_payment_amounts() {
        let b = booking(1000.0);
        let charge = payment(1, PaymentKind::Charge, 1000.0, PaymentStatus::Confirmed, None);
        let refund = payment(2, PaymentKind::Refund, 250.0, PaymentStatus::Completed, Some(1));
        let payments = vec![charge.clone(), refund];

        assert_eq!(expected_charge_amount(&b, &payments), 750.0);
        assert_eq!(refundable_amount(&charge, &payments), 750.0);
        assert!(amounts_match(750.004, 750.0));
        assert!(!amounts_match(750.02, 750.0));

        let mut violations = Violations::new();
        check_refund_amount(&charge, 800.0, &payments, &mut violations);
        assert!(!violations.is_empty());

        let mut violations = Violations::new();
        check_refund_amount(&charge, 750.0, &payments, &mut violations);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_guide_needs_destination() {
        let mut violations = Violations::new();
        check_staff_assignment("Tour Guide", &[], &mut violations);
        assert!(!violations.is_empty());

        let mut violations = Violations::new();
        check_staff_assignment("driver", &[], &mut violations);
        check_booking_dates(NaiveDate::from_ymd_opt(2024, 1, 2), NaiveDate::from_ymd_opt(2024, 1, 2), &mut violations);
        assert!(violations.is_empty());
    }
}
