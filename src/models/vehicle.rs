//! Modelo de Vehicle

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordMeta};
use crate::database::Table;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    /// Normalizada: mayúsculas y sin separadores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    pub capacity: u32,
    /// Destinos que cubre; vacío significa sin restricción
    #[serde(default)]
    pub destination_ids: Vec<u64>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Vehicle {
    pub fn serves(&self, destination_id: u64) -> bool {
        self.destination_ids.is_empty() || self.destination_ids.contains(&destination_id)
    }
}

impl Record for Vehicle {
    const TABLE: Table = Table::Vehicles;
    const RESOURCE: &'static str = "Vehicle";

    fn id(&self) -> u64 {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}
