use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{FeedbackStatus, FeedbackType};
use crate::utils::validation::validate_not_empty;

// Request para crear feedback
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    pub customer_id: u64,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    #[validate(length(max = 2000), custom = "validate_not_empty")]
    pub message: String,
    pub related_booking_id: Option<u64>,
    /// Sólo se acepta en importaciones
    pub feedback_status: Option<FeedbackStatus>,
}

// Request para actualizar feedback
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFeedbackRequest {
    #[serde(rename = "type")]
    pub feedback_type: Option<FeedbackType>,
    #[validate(length(max = 2000), custom = "validate_not_empty")]
    pub message: Option<String>,
    pub related_booking_id: Option<u64>,
    pub feedback_status: Option<FeedbackStatus>,
}

// Nota de administración
#[derive(Debug, Deserialize, Validate)]
pub struct AdminNoteRequest {
    #[validate(length(max = 1000), custom = "validate_not_empty")]
    pub text: String,
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub author: String,
}

// Importación masiva (admin)
#[derive(Debug, Deserialize)]
pub struct FeedbackImportRequest {
    pub items: Vec<CreateFeedbackRequest>,
}

// Purga de feedback inactivo (admin)
#[derive(Debug, Default, Deserialize)]
pub struct PurgeQuery {
    pub deleted_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub purged_count: usize,
    pub remaining_count: usize,
    pub purged_ids: Vec<u64>,
}

// Filtros del listado de feedback
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackListQuery {
    #[serde(rename = "type")]
    pub feedback_type: Option<FeedbackType>,
    pub feedback_status: Option<FeedbackStatus>,
    pub customer_id: Option<u64>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub include_inactive: Option<bool>,
    /// Lista separada por comas de campos a devolver
    pub fields: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// Query del resumen
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackSummaryQuery {
    pub customer_id: Option<u64>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub include_inactive: Option<bool>,
    pub include_trends: Option<bool>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct FeedbackCounts {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

// Resumen de feedback
#[derive(Debug, Serialize)]
pub struct FeedbackSummary {
    #[serde(flatten)]
    pub counts: FeedbackCounts,
    /// Porcentaje resuelto, con dos decimales
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_rate: Option<f64>,
    /// Clave `YYYY-MM`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_trends: Option<BTreeMap<String, FeedbackCounts>>,
}
