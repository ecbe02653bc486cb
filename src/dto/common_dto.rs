use serde::{Deserialize, Serialize};

use crate::models::RecordStatus;
use crate::services::cascade::CascadeReport;

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

// Query de DELETE: lógico por defecto, `?hard=true` para definitivo
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    pub hard: Option<bool>,
}

impl DeleteParams {
    pub fn is_hard(&self) -> bool {
        self.hard.unwrap_or(false)
    }
}

// Resultado de un DELETE
#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Soft {
        id: u64,
        status: RecordStatus,
        /// false si el registro ya estaba inactivo
        changed: bool,
    },
    Hard {
        id: u64,
        cascade: CascadeReport,
    },
}

// Query de GET por id
#[derive(Debug, Default, Deserialize)]
pub struct FieldsParams {
    pub fields: Option<String>,
}
