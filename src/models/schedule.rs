//! Modelo de Schedule
//!
//! Una salida programada: ventana temporal semiabierta `[starts_at, ends_at)`
//! asociada a un vehículo, a un destino o a ambos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{Record, RecordMeta};
use crate::database::Table;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: u64,
    pub destination_id: Option<u64>,
    pub vehicle_id: Option<u64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: u32,
    #[serde(flatten)]
    pub meta: RecordMeta,
}

/// Situación de la salida respecto al momento actual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulePhase {
    Upcoming,
    Ongoing,
    Finished,
}

impl Schedule {
    /// Dos ventanas semiabiertas se solapan si cada una empieza antes de que
    /// termine la otra. Tocarse en un extremo no cuenta.
    pub fn overlaps(&self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> bool {
        self.starts_at < ends_at && starts_at < self.ends_at
    }

    pub fn phase_at(&self, now: DateTime<Utc>) -> SchedulePhase {
        if now < self.starts_at {
            SchedulePhase::Upcoming
        } else if now < self.ends_at {
            SchedulePhase::Ongoing
        } else {
            SchedulePhase::Finished
        }
    }
}

impl Record for Schedule {
    const TABLE: Table = Table::Schedules;
    const RESOURCE: &'static str = "Schedule";

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
