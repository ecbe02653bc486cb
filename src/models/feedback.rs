//! Modelo de Feedback
//!
//! Quejas y sugerencias de clientes. Las notas de administración sólo se
//! añaden, nunca se editan ni se borran.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{Record, RecordMeta};
use crate::database::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    Complaint,
    Suggestion,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    Open,
    Pending,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminNote {
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: u64,
    pub customer_id: u64,
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_booking_id: Option<u64>,
    #[serde(default)]
    pub feedback_status: FeedbackStatus,
    #[serde(default)]
    pub admin_notes: Vec<AdminNote>,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

impl Record for Feedback {
    const TABLE: Table = Table::Feedback;
    const RESOURCE: &'static str = "Feedback";

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
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let raw = json!({
            "id": 3,
            "customer_id": 1,
            "type": "complaint",
            "message": "Bus was late",
            "status": "active",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        });

        let feedback: Feedback = serde_json::from_value(raw).unwrap();
        assert_eq!(feedback.feedback_type, FeedbackType::Complaint);
        assert_eq!(feedback.feedback_status, FeedbackStatus::Open);
        assert!(feedback.admin_notes.is_empty());
        assert!(feedback.meta.is_active());

        let back = serde_json::to_value(&feedback).unwrap();
        assert_eq!(back["type"], "complaint");
        assert_eq!(back["status"], "active");
        assert!(back.get("deactivated_at").is_none());
    }
}
