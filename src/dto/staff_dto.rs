use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{validate_email, validate_not_empty};

// Request para dar de alta personal
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub name: String,
    #[validate(length(max = 60), custom = "validate_not_empty")]
    pub role: String,
    #[validate(custom = "validate_email")]
    pub contact_email: String,
    #[serde(default)]
    pub destination_ids: Vec<u64>,
}

// Request para actualizar personal
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStaffRequest {
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub name: Option<String>,
    #[validate(length(max = 60), custom = "validate_not_empty")]
    pub role: Option<String>,
    #[validate(custom = "validate_email")]
    pub contact_email: Option<String>,
    pub destination_ids: Option<Vec<u64>>,
}

// Filtros del listado de personal
#[derive(Debug, Default, Deserialize)]
pub struct StaffListQuery {
    pub name: Option<String>,
    pub role: Option<String>,
    pub destination_id: Option<u64>,
    pub include_inactive: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RoleSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

// Resumen de personal por rol
#[derive(Debug, Serialize)]
pub struct StaffSummary {
    pub total_staff: usize,
    pub by_role: BTreeMap<String, RoleSummary>,
    /// Personal activo por destino asignado
    pub by_destination: BTreeMap<u64, usize>,
}
