//! Repositorios
//!
//! Acceso a las tablas JSON. `TableRepository` cubre las operaciones comunes
//! y cada entidad añade sus consultas propias.

pub mod table_repository;
pub mod customer_repository;
pub mod destination_repository;
pub mod booking_repository;
pub mod schedule_repository;
pub mod payment_repository;
pub mod vehicle_repository;
pub mod staff_repository;
pub mod feedback_repository;

pub use table_repository::TableRepository;
pub use customer_repository::CustomerRepository;
pub use destination_repository::DestinationRepository;
pub use booking_repository::BookingRepository;
pub use schedule_repository::ScheduleRepository;
pub use payment_repository::PaymentRepository;
pub use vehicle_repository::VehicleRepository;
pub use staff_repository::StaffRepository;
pub use feedback_repository::FeedbackRepository;
