//! Controladores por entidad
//!
//! Cada controlador se construye por petición a partir del almacén compartido
//! y agrupa las operaciones de su tabla.

pub mod booking_controller;
pub mod customer_controller;
pub mod destination_controller;
pub mod feedback_controller;
pub mod payment_controller;
pub mod schedule_controller;
pub mod staff_controller;
pub mod vehicle_controller;
