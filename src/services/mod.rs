//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: ciclo de
//! vida, validación entre tablas, cascadas y la capa de consulta.

pub mod cascade;
pub mod lifecycle;
pub mod query;
pub mod validator;

pub use cascade::{CascadeReport, CascadeService};
pub use lifecycle::Transition;
pub use query::{ListParams, ListQuery, Page, Sorting, SortOrder};
