use super::TableRepository;
use crate::models::Booking;
use crate::utils::errors::AppResult;

pub type BookingRepository = TableRepository<Booking>;

impl BookingRepository {
    /// Reservas de un cliente, en orden de inserción
    pub async fn find_by_customer(&self, customer_id: u64) -> AppResult<Vec<Booking>> {
        let bookings = self.load().await?;
        Ok(bookings
            .into_iter()
            .filter(|b| b.customer_id == customer_id)
            .collect())
    }
}
