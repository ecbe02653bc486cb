//! Módulo de almacenamiento
//!
//! Maneja las tablas JSON que hacen de base de datos

pub mod json_store;
pub mod table;

pub use json_store::JsonStore;
pub use table::Table;
