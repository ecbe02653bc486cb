//! Modelo de Destination
//!
//! El precio es por viajero; las reservas lo usan para calcular su importe
//! por defecto.

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordMeta};
use crate::database::Table;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: u64,
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Record for Destination {
    const TABLE: Table = Table::Destinations;
    const RESOURCE: &'static str = "Destination";

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
