//! Middleware del sistema
//!
//! Configuración de CORS para el router principal. El registro de peticiones
//! lo hace `TraceLayer` directamente en `routes`.

pub mod cors;
