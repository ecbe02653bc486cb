use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::validate_not_empty;

// Request para crear un destino
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDestinationRequest {
    #[validate(length(max = 120), custom = "validate_not_empty")]
    pub name: String,
    #[validate(length(max = 80), custom = "validate_not_empty")]
    pub country: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0.01))]
    pub price: f64,
}

// Request para actualizar un destino
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDestinationRequest {
    #[validate(length(max = 120), custom = "validate_not_empty")]
    pub name: Option<String>,
    #[validate(length(max = 80), custom = "validate_not_empty")]
    pub country: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0.01))]
    pub price: Option<f64>,
}

// Filtros del listado de destinos
#[derive(Debug, Default, Deserialize)]
pub struct DestinationListQuery {
    pub name: Option<String>,
    pub country: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub include_inactive: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}
