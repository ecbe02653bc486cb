//! DTOs de la API
//!
//! Requests validados con `validator` y respuestas específicas de cada
//! recurso.

pub mod common_dto;
pub mod customer_dto;
pub mod destination_dto;
pub mod booking_dto;
pub mod schedule_dto;
pub mod payment_dto;
pub mod vehicle_dto;
pub mod staff_dto;
pub mod feedback_dto;

pub use common_dto::{ApiResponse, DeleteOutcome, DeleteParams};
