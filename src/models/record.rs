//! Metadatos comunes de los registros
//!
//! Todas las entidades comparten un identificador numérico y un bloque de
//! ciclo de vida (`status`, `created_at`, `updated_at`, `deactivated_at`)
//! que se aplana en el JSON del registro.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::database::Table;

/// Estado de ciclo de vida de un registro
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    #[serde(default)]
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl RecordMeta {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
            deactivated_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Un registro persistido en una tabla JSON
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;
    /// Nombre legible para mensajes de error
    const RESOURCE: &'static str;

    fn id(&self) -> u64;
    fn assign_id(&mut self, id: u64);
    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn is_active(&self) -> bool {
        self.meta().is_active()
    }
}
