//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::{EnvironmentConfig, StorageConfig};
use crate::database::JsonStore;
use crate::utils::errors::{AppError, AppResult};

/// Cabecera con la clave de administración
pub const ADMIN_KEY_HEADER: &str = "x-api-key";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(store: JsonStore, config: EnvironmentConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Abrir el almacén del directorio configurado y preparar sus tablas
    pub async fn from_config(config: EnvironmentConfig) -> AppResult<Self> {
        let store = JsonStore::new(&StorageConfig::from(&config));
        store.init().await?;
        Ok(Self::new(store, config))
    }

    /// Comprobar la cabecera `x-api-key` de los endpoints de administración.
    /// Sin clave configurada, estos endpoints quedan cerrados.
    pub fn require_admin(&self, headers: &HeaderMap) -> AppResult<()> {
        let Some(expected) = self.config.admin_api_key.as_deref() else {
            tracing::warn!("🔒 Endpoint de administración sin ADMIN_API_KEY configurada");
            return Err(AppError::Unauthorized(
                "Admin endpoints are disabled".to_string(),
            ));
        };

        let provided = headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(key) if key == expected => Ok(()),
            _ => Err(AppError::Unauthorized(
                "Valid admin API key required for this endpoint".to_string(),
            )),
        }
    }
}
