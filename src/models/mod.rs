//! Modelos del sistema
//!
//! Este módulo contiene los registros persistidos en las tablas JSON.
//! Cada entidad aplana su `RecordMeta` con el estado de ciclo de vida.

pub mod record;
pub mod customer;
pub mod destination;
pub mod booking;
pub mod schedule;
pub mod payment;
pub mod vehicle;
pub mod staff;
pub mod feedback;

pub use record::{Record, RecordMeta, RecordStatus};
pub use customer::Customer;
pub use destination::Destination;
pub use booking::{Booking, BookingStatus};
pub use schedule::{Schedule, SchedulePhase};
pub use payment::{Payment, PaymentKind, PaymentMethod, PaymentStatus};
pub use vehicle::Vehicle;
pub use staff::Staff;
pub use feedback::{AdminNote, Feedback, FeedbackStatus, FeedbackType};
