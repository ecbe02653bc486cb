use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Booking, Customer};
use crate::utils::validation::{validate_email, validate_not_empty};

// Request para crear un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub name: String,
    #[validate(custom = "validate_email")]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 30))]
    pub phone: Option<String>,
}

// Request para actualizar un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub name: Option<String>,
    #[validate(custom = "validate_email")]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 30))]
    pub phone: Option<String>,
}

// Filtros del listado de clientes
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub include_inactive: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// Cliente con sus reservas
#[derive(Debug, Serialize)]
pub struct CustomerBookingsResponse {
    pub customer: Customer,
    pub bookings: Vec<Booking>,
    pub total_bookings: usize,
}
