//! API de gestión de viajes sobre ficheros JSON
//!
//! Clientes, destinos, reservas, horarios, pagos, vehículos, personal y
//! feedback, con borrado lógico, borrado definitivo en cascada y listados
//! filtrados y paginados.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;
