use super::TableRepository;
use crate::models::Payment;
use crate::utils::errors::AppResult;

pub type PaymentRepository = TableRepository<Payment>;

impl PaymentRepository {
    pub async fn find_by_booking(&self, booking_id: u64) -> AppResult<Vec<Payment>> {
        let payments = self.load().await?;
        Ok(payments
            .into_iter()
            .filter(|p| p.booking_id == booking_id)
            .collect())
    }
}
