//! Modelo de Staff

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordMeta};
use crate::database::Table;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub contact_email: String,
    #[serde(default)]
    pub destination_ids: Vec<u64>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// Un rol que contiene "guide" exige al menos un destino asignado
pub fn is_guide_role(role: &str) -> bool {
    role.to_lowercase().contains("guide")
}

impl Staff {
    pub fn is_guide(&self) -> bool {
        is_guide_role(&self.role)
    }
}

impl Record for Staff {
    const TABLE: Table = Table::Staff;
    const RESOURCE: &'static str = "Staff";

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guide_role() {
        assert!(is_guide_role("Tour Guide"));
        assert!(is_guide_role("GUIDE"));
        assert!(!is_guide_role("driver"));
    }
}
