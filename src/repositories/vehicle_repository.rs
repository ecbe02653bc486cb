use super::TableRepository;
use crate::models::Vehicle;
use crate::utils::errors::AppResult;
use crate::utils::validation::normalize_license_plate;

pub type VehicleRepository = TableRepository<Vehicle>;

impl VehicleRepository {
    /// Comprobar si la matrícula ya está registrada (ignora separadores)
    pub async fn license_plate_exists(&self, plate: &str, exclude_id: Option<u64>) -> AppResult<bool> {
        let wanted = normalize_license_plate(plate);
        let vehicles = self.load().await?;
        Ok(vehicles.iter().any(|v| {
            Some(v.id) != exclude_id
                && v
                    .license_plate
                    .as_deref()
                    .is_some_and(|p| normalize_license_plate(p) == wanted)
        }))
    }
}
