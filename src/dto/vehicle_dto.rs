use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{validate_license_plate, validate_not_empty};

// Request para crear un vehículo
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[serde(rename = "type")]
    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub vehicle_type: String,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub capacity: u32,
    #[serde(default)]
    pub destination_ids: Vec<u64>,
}

// Request para actualizar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[serde(rename = "type")]
    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub vehicle_type: Option<String>,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub capacity: Option<u32>,
    pub destination_ids: Option<Vec<u64>>,
}

// Alta masiva: todos o ninguno
#[derive(Debug, Deserialize)]
pub struct BulkVehicleRequest {
    pub vehicles: Vec<CreateVehicleRequest>,
}

// Filtros del listado de vehículos
#[derive(Debug, Default, Deserialize)]
pub struct VehicleListQuery {
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
    pub min_capacity: Option<u32>,
    pub destination_id: Option<u64>,
    pub license_plate: Option<String>,
    pub include_inactive: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}
