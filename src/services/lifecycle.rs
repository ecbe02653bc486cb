//! Ciclo de vida de los registros
//!
//! `active -> inactive -> active`. El borrado definitivo no pasa por aquí:
//! lo resuelve el servicio de cascada.

use chrono::Utc;

use crate::models::{Record, RecordStatus};
use crate::utils::errors::{invalid_transition_error, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// El registro ya estaba en el estado pedido
    Unchanged,
}

/// Borrado lógico. Repetirlo no es un error.
pub fn soft_delete<T: Record>(record: &mut T) -> Transition {
    if !record.is_active() {
        return Transition::Unchanged;
    }

    let now = Utc::now();
    let meta = record.meta_mut();
    meta.status = RecordStatus::Inactive;
    meta.deactivated_at = Some(now);
    meta.updated_at = now;
    Transition::Applied
}

/// Sólo un registro inactivo puede reactivarse
pub fn reactivate<T: Record>(record: &mut T) -> AppResult<()> {
    if record.is_active() {
        return Err(invalid_transition_error(
            T::RESOURCE,
            record.id(),
            "record is already active",
        ));
    }

    let meta = record.meta_mut();
    meta.status = RecordStatus::Active;
    meta.deactivated_at = None;
    meta.touch();
    Ok(())
}

/// Rechaza modificaciones sobre registros dados de baja
pub fn ensure_mutable<T: Record>(record: &T) -> AppResult<()> {
    if record.is_active() {
        Ok(())
    } else {
        Err(invalid_transition_error(
            T::RESOURCE,
            record.id(),
            "record is inactive, reactivate it first",
        ))
    }
}
