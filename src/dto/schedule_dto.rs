use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// Request para crear un horario
#[derive(Debug, Deserialize, Validate)]
pub struct CreateScheduleRequest {
    pub destination_id: Option<u64>,
    pub vehicle_id: Option<u64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Por defecto: capacidad del vehículo
    #[validate(range(min = 1))]
    pub capacity: Option<u32>,
}

// Request para actualizar un horario
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateScheduleRequest {
    pub destination_id: Option<u64>,
    pub vehicle_id: Option<u64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub capacity: Option<u32>,
}

// Filtros del listado de horarios
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleListQuery {
    pub vehicle_id: Option<u64>,
    pub destination_id: Option<u64>,
    pub starts_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    pub include_inactive: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// Conteo de horarios por estado
#[derive(Debug, Serialize)]
pub struct ScheduleStatusSummary {
    /// active / inactive
    pub status_counts: BTreeMap<String, usize>,
    /// upcoming / ongoing / finished, sólo horarios activos
    pub phase_counts: BTreeMap<String, usize>,
    pub total: usize,
}
