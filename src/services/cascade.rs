//! Borrado definitivo con cascada
//!
//! | Padre | Dependiente | Efecto |
//! |---|---|---|
//! | Customer | bookings (y sus payments), feedback | borrado |
//! | Booking | payments | borrado |
//! | Booking | `feedback.related_booking_id` | se anula |
//! | Destination | schedules | borrado |
//! | Destination | `booking.destination_id` | se anula |
//! | Destination | `destination_ids` de vehicles y staff | se quita el id |
//! | Vehicle | `schedule.vehicle_id` | se anula |
//! | Payment | `refund_of` de sus reembolsos | se anula |
//!
//! El llamador debe tener tomado el `write_guard` del store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::database::{JsonStore, Table};
use crate::models::{Booking, Customer, Destination, Feedback, Payment, Record, Schedule, Staff, Vehicle};
use crate::utils::errors::{not_found_error, AppResult};

/// Resumen de lo que ha provocado un borrado definitivo
#[derive(Debug, Clone, Serialize)]
pub struct CascadeReport {
    pub table: Table,
    pub id: u64,
    pub deleted: BTreeMap<Table, Vec<u64>>,
    pub invalidated: BTreeMap<Table, Vec<u64>>,
}

impl CascadeReport {
    fn new(table: Table, id: u64) -> Self {
        Self {
            table,
            id,
            deleted: BTreeMap::new(),
            invalidated: BTreeMap::new(),
        }
    }

    fn deleted(&mut self, table: Table, ids: Vec<u64>) {
        if !ids.is_empty() {
            self.deleted.entry(table).or_default().extend(ids);
        }
    }

    fn invalidated(&mut self, table: Table, ids: Vec<u64>) {
        if !ids.is_empty() {
            self.invalidated.entry(table).or_default().extend(ids);
        }
    }

    pub fn total_affected(&self) -> usize {
        self.deleted.values().chain(self.invalidated.values()).map(Vec::len).sum()
    }
}

pub struct CascadeService {
    store: Arc<JsonStore>,
}

impl CascadeService {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }

    pub async fn delete_customer(&self, id: u64) -> AppResult<CascadeReport> {
        let mut customers: Vec<Customer> = self.store.load(Table::Customers).await?;
        take(&mut customers, id)?;

        let mut report = CascadeReport::new(Table::Customers, id);

        let mut bookings: Vec<Booking> = self.store.load(Table::Bookings).await?;
        let booking_ids = remove_where(&mut bookings, |b| b.customer_id == id);

        let mut payments: Vec<Payment> = self.store.load(Table::Payments).await?;
        let payment_ids = remove_where(&mut payments, |p| booking_ids.contains(&p.booking_id));
        let orphan_refunds = invalidate_where(
            &mut payments,
            |p| p.refund_of.is_some_and(|of| payment_ids.contains(&of)),
            |p| p.refund_of = None,
        );

        let mut feedback: Vec<Feedback> = self.store.load(Table::Feedback).await?;
        let feedback_ids = remove_where(&mut feedback, |f| f.customer_id == id);
        let unlinked = invalidate_where(
            &mut feedback,
            |f| f.related_booking_id.is_some_and(|b| booking_ids.contains(&b)),
            |f| f.related_booking_id = None,
        );

        if !payment_ids.is_empty() || !orphan_refunds.is_empty() {
            self.store.save(Table::Payments, &payments).await?;
        }
        if !feedback_ids.is_empty() || !unlinked.is_empty() {
            self.store.save(Table::Feedback, &feedback).await?;
        }
        if !booking_ids.is_empty() {
            self.store.save(Table::Bookings, &bookings).await?;
        }
        self.store.save(Table::Customers, &customers).await?;

        report.deleted(Table::Bookings, booking_ids);
        report.deleted(Table::Payments, payment_ids);
        report.deleted(Table::Feedback, feedback_ids);
        report.invalidated(Table::Payments, orphan_refunds);
        report.invalidated(Table::Feedback, unlinked);

        log_report(&report);
        Ok(report)
    }

    pub async fn delete_booking(&self, id: u64) -> AppResult<CascadeReport> {
        let mut bookings: Vec<Booking> = self.store.load(Table::Bookings).await?;
        take(&mut bookings, id)?;

        let mut report = CascadeReport::new(Table::Bookings, id);

        let mut payments: Vec<Payment> = self.store.load(Table::Payments).await?;
        let payment_ids = remove_where(&mut payments, |p| p.booking_id == id);

        let mut feedback: Vec<Feedback> = self.store.load(Table::Feedback).await?;
        let unlinked = invalidate_where(
            &mut feedback,
            |f| f.related_booking_id == Some(id),
            |f| f.related_booking_id = None,
        );

        if !payment_ids.is_empty() {
            self.store.save(Table::Payments, &payments).await?;
        }
        if !unlinked.is_empty() {
            self.store.save(Table::Feedback, &feedback).await?;
        }
        self.store.save(Table::Bookings, &bookings).await?;

        report.deleted(Table::Payments, payment_ids);
        report.invalidated(Table::Feedback, unlinked);

        log_report(&report);
        Ok(report)
    }

    pub async fn delete_destination(&self, id: u64) -> AppResult<CascadeReport> {
        let mut destinations: Vec<Destination> = self.store.load(Table::Destinations).await?;
        take(&mut destinations, id)?;

        let mut report = CascadeReport::new(Table::Destinations, id);

        let mut schedules: Vec<Schedule> = self.store.load(Table::Schedules).await?;
        let schedule_ids = remove_where(&mut schedules, |s| s.destination_id == Some(id));

        let mut bookings: Vec<Booking> = self.store.load(Table::Bookings).await?;
        let unlinked_bookings = invalidate_where(
            &mut bookings,
            |b| b.destination_id == Some(id),
            |b| b.destination_id = None,
        );

        let mut vehicles: Vec<Vehicle> = self.store.load(Table::Vehicles).await?;
        let unlinked_vehicles = invalidate_where(
            &mut vehicles,
            |v| v.destination_ids.contains(&id),
            |v| v.destination_ids.retain(|d| *d != id),
        );

        let mut staff: Vec<Staff> = self.store.load(Table::Staff).await?;
        let unlinked_staff = invalidate_where(
            &mut staff,
            |s| s.destination_ids.contains(&id),
            |s| s.destination_ids.retain(|d| *d != id),
        );

        if !schedule_ids.is_empty() {
            self.store.save(Table::Schedules, &schedules).await?;
        }
        if !unlinked_bookings.is_empty() {
            self.store.save(Table::Bookings, &bookings).await?;
        }
        if !unlinked_vehicles.is_empty() {
            self.store.save(Table::Vehicles, &vehicles).await?;
        }
        if !unlinked_staff.is_empty() {
            self.store.save(Table::Staff, &staff).await?;
        }
        self.store.save(Table::Destinations, &destinations).await?;

        report.deleted(Table::Schedules, schedule_ids);
        report.invalidated(Table::Bookings, unlinked_bookings);
        report.invalidated(Table::Vehicles, unlinked_vehicles);
        report.invalidated(Table::Staff, unlinked_staff);

        log_report(&report);
        Ok(report)
    }

    pub async fn delete_vehicle(&self, id: u64) -> AppResult<CascadeReport> {
        let mut vehicles: Vec<Vehicle> = self.store.load(Table::Vehicles).await?;
        take(&mut vehicles, id)?;

        let mut report = CascadeReport::new(Table::Vehicles, id);

        let mut schedules: Vec<Schedule> = self.store.load(Table::Schedules).await?;
        let unlinked = invalidate_where(
            &mut schedules,
            |s| s.vehicle_id == Some(id),
            |s| s.vehicle_id = None,
        );

        if !unlinked.is_empty() {
            self.store.save(Table::Schedules, &schedules).await?;
        }
        self.store.save(Table::Vehicles, &vehicles).await?;

        report.invalidated(Table::Schedules, unlinked);

        log_report(&report);
        Ok(report)
    }

    pub async fn delete_payment(&self, id: u64) -> AppResult<CascadeReport> {
        let mut payments: Vec<Payment> = self.store.load(Table::Payments).await?;
        take(&mut payments, id)?;

        let mut report = CascadeReport::new(Table::Payments, id);
        let unlinked = invalidate_where(
            &mut payments,
            |p| p.refund_of == Some(id),
            |p| p.refund_of = None,
        );
        self.store.save(Table::Payments, &payments).await?;

        report.invalidated(Table::Payments, unlinked);

        log_report(&report);
        Ok(report)
    }

    /// Borrado de entidades sin dependientes (staff, schedules, feedback)
    pub async fn delete_leaf<T: Record>(&self, id: u64) -> AppResult<CascadeReport> {
        let mut records: Vec<T> = self.store.load(T::TABLE).await?;
        take(&mut records, id)?;
        self.store.save(T::TABLE, &records).await?;

        let report = CascadeReport::new(T::TABLE, id);
        log_report(&report);
        Ok(report)
    }
}

/// Quitar el registro `id` de la tabla o fallar con NotFound
fn take<T: Record>(records: &mut Vec<T>, id: u64) -> AppResult<T> {
    let position = records
        .iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| not_found_error(T::RESOURCE, id))?;
    Ok(records.remove(position))
}

fn remove_where<T: Record>(records: &mut Vec<T>, predicate: impl Fn(&T) -> bool) -> Vec<u64> {
    let removed: Vec<u64> = records.iter().filter(|r| predicate(r)).map(Record::id).collect();
    records.retain(|r| !predicate(r));
    removed
}

fn invalidate_where<T: Record>(
    records: &mut [T],
    predicate: impl Fn(&T) -> bool,
    mut apply: impl FnMut(&mut T),
) -> Vec<u64> {
    let now = Utc::now();
    let mut touched = Vec::new();
    for record in records.iter_mut().filter(|r| predicate(r)) {
        apply(record);
        record.meta_mut().updated_at = now;
        touched.push(record.id());
    }
    touched
}

fn log_report(report: &CascadeReport) {
    tracing::info!(
        "🗑️  {} {} borrado definitivamente ({} dependientes afectados)",
        report.table,
        report.id,
        report.total_affected()
    );
    for (table, ids) in &report.deleted {
        tracing::debug!("   ↳ borrados en {}: {:?}", table, ids);
    }
    for (table, ids) in &report.invalidated {
        tracing::debug!("   ↳ referencias anuladas en {}: {:?}", table, ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::models::{
        AdminNote, BookingStatus, FeedbackStatus, FeedbackType, PaymentKind, PaymentMethod,
        PaymentStatus, RecordMeta,
    };
    use crate::utils::errors::AppError;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> Arc<JsonStore> {
        let store = JsonStore::new(&StorageConfig::new(dir.path()));
        store.init().await.unwrap();
        Arc::new(store)
    }

    fn booking(id: u64, customer_id: u64, destination_id: u64) -> Booking {
        Booking {
            id,
            customer_id,
            destination_id: Some(destination_id),
            start_date: None,
            end_date: None,
            travelers: 1,
            total_amount: 100.0,
            booking_status: BookingStatus::Pending,
            meta: RecordMeta::new(),
        }
    }

    fn payment(id: u64, booking_id: u64, refund_of: Option<u64>) -> Payment {
        Payment {
            id,
            booking_id,
            method: PaymentMethod::Paypal,
            kind: if refund_of.is_some() { PaymentKind::Refund } else { PaymentKind::Charge },
            amount: 100.0,
            payment_status: PaymentStatus::Completed,
            transaction_date: Utc::now(),
            refund_of,
            reason: None,
            meta: RecordMeta::new(),
        }
    }

    fn feedback(id: u64, customer_id: u64, related_booking_id: Option<u64>) -> Feedback {
        Feedback {
            id,
            customer_id,
            feedback_type: FeedbackType::Suggestion,
            message: "More trips".to_string(),
            related_booking_id,
            feedback_status: FeedbackStatus::Open,
            admin_notes: vec![AdminNote {
                text: "seen".to_string(),
                author: "ops".to_string(),
                timestamp: Utc::now(),
            }],
            meta: RecordMeta::new(),
        }
    }

    fn customer(id: u64) -> Customer {
        Customer {
            id,
            name: format!("Customer {}", id),
            email: None,
            phone: None,
            meta: RecordMeta::new(),
        }
    }

    #[tokio::test]
    async fn test_customer_cascade() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store.save(Table::Customers, &[customer(1), customer(2)]).await.unwrap();
        store
            .save(Table::Bookings, &[booking(10, 1, 1), booking(11, 2, 1), booking(12, 1, 1)])
            .await
            .unwrap();
        store
            .save(Table::Payments, &[payment(20, 10, None), payment(21, 11, None), payment(22, 10, Some(20))])
            .await
            .unwrap();
        store
            .save(Table::Feedback, &[feedback(30, 1, Some(10)), feedback(31, 2, Some(11))])
            .await
            .unwrap();

        let report = CascadeService::new(store.clone()).delete_customer(1).await.unwrap();

        assert_eq!(report.deleted[&Table::Bookings], vec![10, 12]);
        assert_eq!(report.deleted[&Table::Payments], vec![20, 22]);
        assert_eq!(report.deleted[&Table::Feedback], vec![30]);

        let bookings: Vec<Booking> = store.load(Table::Bookings).await.unwrap();
        assert_eq!(bookings.iter().map(|b| b.id).collect::<Vec<_>>(), vec![11]);
        let payments: Vec<Payment> = store.load(Table::Payments).await.unwrap();
        assert_eq!(payments.iter().map(|p| p.id).collect::<Vec<_>>(), vec![21]);
        let customers: Vec<Customer> = store.load(Table::Customers).await.unwrap();
        assert_eq!(customers.len(), 1);
    }

    #[tokio::test]
    async fn test_booking_cascade_unlinks_feedback() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store.save(Table::Bookings, &[booking(10, 1, 1)]).await.unwrap();
        store.save(Table::Payments, &[payment(20, 10, None)]).await.unwrap();
        store.save(Table::Feedback, &[feedback(30, 1, Some(10))]).await.unwrap();

        let report = CascadeService::new(store.clone()).delete_booking(10).await.unwrap();
        assert_eq!(report.deleted[&Table::Payments], vec![20]);
        assert_eq!(report.invalidated[&Table::Feedback], vec![30]);

        let feedback: Vec<Feedback> = store.load(Table::Feedback).await.unwrap();
        assert_eq!(feedback[0].related_booking_id, None);
        assert_eq!(feedback[0].admin_notes.len(), 1);
    }

    #[tokio::test]
    async fn test_destination_cascade() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let at = |h| Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap();

        store
            .save(
                Table::Destinations,
                &[Destination {
                    id: 1,
                    name: "Lisbon".to_string(),
                    country: "Portugal".to_string(),
                    description: None,
                    price: 100.0,
                    meta: RecordMeta::new(),
                }],
            )
            .await
            .unwrap();
        store.save(Table::Bookings, &[booking(10, 1, 1)]).await.unwrap();
        store
            .save(
                Table::Schedules,
                &[Schedule {
                    id: 40,
                    destination_id: Some(1),
                    vehicle_id: None,
                    starts_at: at(10),
                    ends_at: at(11),
                    capacity: 5,
                    meta: RecordMeta::new(),
                }],
            )
            .await
            .unwrap();
        store
            .save(
                Table::Staff,
                &[Staff {
                    id: 50,
                    name: "Rui".to_string(),
                    role: "guide".to_string(),
                    contact_email: "rui@example.com".to_string(),
                    destination_ids: vec![1, 2],
                    meta: RecordMeta::new(),
                }],
            )
            .await
            .unwrap();

        let report = CascadeService::new(store.clone()).delete_destination(1).await.unwrap();
        assert_eq!(report.deleted[&Table::Schedules], vec![40]);
        assert_eq!(report.invalidated[&Table::Bookings], vec![10]);
        assert_eq!(report.invalidated[&Table::Staff], vec![50]);
        assert!(!report.invalidated.contains_key(&Table::Vehicles));

        let staff: Vec<Staff> = store.load(Table::Staff).await.unwrap();
        assert_eq!(staff[0].destination_ids, vec![2]);
        let bookings: Vec<Booking> = store.load(Table::Bookings).await.unwrap();
        assert_eq!(bookings[0].destination_id, None);
    }

    #[tokio::test]
    async fn test_vehicle_cascade_unlinks_schedules() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let at = |h| Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap();
        let stale = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

        store
            .save(
                Table::Vehicles,
                &[Vehicle {
                    id: 7,
                    vehicle_type: "minibus".to_string(),
                    license_plate: Some("AB123CD".to_string()),
                    capacity: 16,
                    destination_ids: vec![],
                    meta: RecordMeta::new(),
                }],
            )
            .await
            .unwrap();

        let schedule = |id, vehicle_id| {
            let mut meta = RecordMeta::new();
            meta.updated_at = stale;
            Schedule {
                id,
                destination_id: Some(1),
                vehicle_id,
                starts_at: at(10),
                ends_at: at(11),
                capacity: 10,
                meta,
            }
        };
        store
            .save(Table::Schedules, &[schedule(40, Some(7)), schedule(41, Some(8))])
            .await
            .unwrap();

        let report = CascadeService::new(store.clone()).delete_vehicle(7).await.unwrap();
        assert!(report.deleted.is_empty());
        assert_eq!(report.invalidated[&Table::Schedules], vec![40]);
        assert_eq!(report.invalidated.len(), 1);

        let schedules: Vec<Schedule> = store.load(Table::Schedules).await.unwrap();
        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[0].vehicle_id, None);
        assert!(schedules[0].meta.updated_at > stale);
        assert_eq!(schedules[1].vehicle_id, Some(8));
        assert_eq!(schedules[1].meta.updated_at, stale);

        let vehicles: Vec<Vehicle> = store.load(Table::Vehicles).await.unwrap();
        assert!(vehicles.is_empty());
    }

    #[tokio::test]
    async fn test_payment_cascade_unlinks_refunds() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let stale = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

        let mut refund = payment(21, 10, Some(20));
        refund.meta.updated_at = stale;
        let mut other = payment(23, 10, Some(22));
        other.meta.updated_at = stale;
        store
            .save(
                Table::Payments,
                &[payment(20, 10, None), refund, payment(22, 10, None), other],
            )
            .await
            .unwrap();

        let report = CascadeService::new(store.clone()).delete_payment(20).await.unwrap();
        assert!(report.deleted.is_empty());
        assert_eq!(report.invalidated[&Table::Payments], vec![21]);

        let payments: Vec<Payment> = store.load(Table::Payments).await.unwrap();
        assert_eq!(payments.iter().map(|p| p.id).collect::<Vec<_>>(), vec![21, 22, 23]);
        assert_eq!(payments[0].refund_of, None);
        assert!(payments[0].meta.updated_at > stale);
        assert_eq!(payments[2].refund_of, Some(22));
        assert_eq!(payments[2].meta.updated_at, stale);
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        let result = CascadeService::new(store).delete_leaf::<Staff>(9).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
