//! Configuración del almacenamiento
//!
//! Este módulo define dónde viven los ficheros JSON que hacen de tablas.

use std::path::PathBuf;

use super::environment::EnvironmentConfig;

/// Configuración del almacén de ficheros JSON
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Crear las tablas que falten (como `[]`) al arrancar
    pub seed_missing_tables: bool,
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            seed_missing_tables: true,
        }
    }
}

impl From<&EnvironmentConfig> for StorageConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self::new(config.data_dir.clone())
    }
}
