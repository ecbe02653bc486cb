use super::TableRepository;
use crate::models::Staff;
use crate::utils::errors::AppResult;

pub type StaffRepository = TableRepository<Staff>;

impl StaffRepository {
    /// Personal activo asignado a un destino
    pub async fn find_assigned_to(&self, destination_id: u64) -> AppResult<Vec<Staff>> {
        let staff = self.load().await?;
        Ok(staff
            .into_iter()
            .filter(|s| s.meta.is_active() && s.destination_ids.contains(&destination_id))
            .collect())
    }
}
