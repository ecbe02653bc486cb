use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{BookingStatus, Customer, Destination, Payment};

// Request para crear una reserva
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub customer_id: u64,
    pub destination_id: u64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 50))]
    pub travelers: Option<u32>,
    /// Por defecto: precio del destino por número de viajeros
    #[validate(range(min = 0.01))]
    pub total_amount: Option<f64>,
}

// Request para actualizar una reserva
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    pub destination_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 50))]
    pub travelers: Option<u32>,
    #[validate(range(min = 0.01))]
    pub total_amount: Option<f64>,
    pub booking_status: Option<BookingStatus>,
}

// Request para cambiar el estado de la reserva
#[derive(Debug, Deserialize)]
pub struct BookingStatusRequest {
    pub booking_status: BookingStatus,
}

// Filtros del listado de reservas
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub booking_status: Option<BookingStatus>,
    pub customer_id: Option<u64>,
    pub destination_id: Option<u64>,
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
    pub include_inactive: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// Estadísticas de reservas
#[derive(Debug, Serialize)]
pub struct BookingStats {
    pub total_bookings: usize,
    pub bookings_by_status: BTreeMap<String, usize>,
    pub average_duration_days: f64,
    pub average_travelers: f64,
    /// Suma de reservas confirmadas y completadas
    pub confirmed_revenue: f64,
}

// Vista resumida de una reserva
#[derive(Debug, Serialize)]
pub struct BookingSummary {
    pub id: u64,
    pub customer: Option<Customer>,
    pub destination: Option<Destination>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration_days: Option<i64>,
    pub travelers: u32,
    pub booking_status: BookingStatus,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub balance_due: f64,
    pub payments: Vec<Payment>,
}
