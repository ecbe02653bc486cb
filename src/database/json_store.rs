//! Almacén de tablas en ficheros JSON
//!
//! Cada tabla es un fichero `<tabla>.json` con un array de objetos. Se carga
//! entera, se modifica en memoria y se reescribe entera (escritura atómica
//! vía fichero temporal + rename). Los identificadores se asignan con una
//! secuencia persistida en `_sequences.json`, así nunca se reutilizan.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::sync::{Mutex, MutexGuard};

use super::table::Table;
use crate::config::StorageConfig;
use crate::utils::errors::{AppError, AppResult};

const SEQUENCES_FILE: &str = "_sequences.json";

#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    seed_missing_tables: bool,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.data_dir.clone(),
            seed_missing_tables: config.seed_missing_tables,
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Preparar el directorio de datos y crear las tablas que falten
    pub async fn init(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root).await?;

        if !self.seed_missing_tables {
            return Ok(());
        }

        for table in Table::ALL {
            let path = self.table_path(table);
            if fs::try_exists(&path).await? {
                continue;
            }
            tracing::info!("🗂️  Creando tabla vacía '{}'", path.display());
            self.write_atomic(&path, b"[]").await?;
        }

        Ok(())
    }

    /// Serializa las operaciones de escritura dentro del proceso.
    /// El guard debe mantenerse durante todo el ciclo leer-modificar-escribir.
    pub async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Cargar una tabla completa, en orden de inserción
    pub async fn load<T: DeserializeOwned>(&self, table: Table) -> AppResult<Vec<T>> {
        let path = self.table_path(table);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!("Table '{}' not found", table)));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&raw)
            .map_err(|e| AppError::Storage(format!("Table '{}' is corrupt: {}", table, e)))
    }

    /// Persistir la tabla completa (sobrescritura, no append)
    pub async fn save<T: Serialize>(&self, table: Table, records: &[T]) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        self.write_atomic(&self.table_path(table), &bytes).await?;
        tracing::debug!("💾 Tabla '{}' guardada ({} registros)", table, records.len());
        Ok(())
    }

    /// Siguiente identificador libre de la tabla
    pub async fn next_id(&self, table: Table) -> AppResult<u64> {
        let ids = self.next_ids(table, 1).await?;
        ids.into_iter()
            .next()
            .ok_or_else(|| AppError::Internal(format!("No id reserved for table '{}'", table)))
    }

    /// Reservar `count` identificadores consecutivos que nunca se han usado
    pub async fn next_ids(&self, table: Table, count: usize) -> AppResult<Vec<u64>> {
        let rows: Vec<serde_json::Value> = self.load(table).await?;
        let max_in_use = rows
            .iter()
            .filter_map(|row| row.get("id").and_then(serde_json::Value::as_u64))
            .max()
            .unwrap_or(0);

        let mut sequences = self.load_sequences().await?;
        let last = sequences
            .get(table.as_str())
            .copied()
            .unwrap_or(0)
            .max(max_in_use);
        let count = count as u64;

        sequences.insert(table.as_str().to_string(), last + count);
        self.save_sequences(&sequences).await?;

        Ok((1..=count).map(|n| last + n).collect())
    }

    fn table_path(&self, table: Table) -> PathBuf {
        self.root.join(table.file_name())
    }

    async fn load_sequences(&self) -> AppResult<BTreeMap<String, u64>> {
        let path = self.root.join(SEQUENCES_FILE);
        match fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(|e| AppError::Storage(format!("Sequence file is corrupt: {}", e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_sequences(&self, sequences: &BTreeMap<String, u64>) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(sequences)?;
        self.write_atomic(&self.root.join(SEQUENCES_FILE), &bytes).await
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> AppResult<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    async fn store_in(dir: &TempDir) -> JsonStore {
        let store = JsonStore::new(&StorageConfig::new(dir.path()));
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_init_seeds_every_table() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;

        for table in Table::ALL {
            let rows: Vec<Value> = store.load(table).await.unwrap();
            assert!(rows.is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_table_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut config = StorageConfig::new(dir.path());
        config.seed_missing_tables = false;
        let store = JsonStore::new(&config);
        store.init().await.unwrap();

        let result: AppResult<Vec<Value>> = store.load(Table::Customers).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_table() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;

        store
            .save(Table::Staff, &[json!({"id": 1}), json!({"id": 2})])
            .await
            .unwrap();
        store.save(Table::Staff, &[json!({"id": 3})]).await.unwrap();

        let rows: Vec<Value> = store.load(Table::Staff).await.unwrap();
        assert_eq!(rows, vec![json!({"id": 3})]);
        assert!(!dir.path().join("staff.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_table_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;
        std::fs::write(dir.path().join("payments.json"), "{not json").unwrap();

        let result: AppResult<Vec<Value>> = store.load(Table::Payments).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;

        assert_eq!(store.next_id(Table::Customers).await.unwrap(), 1);
        assert_eq!(store.next_id(Table::Customers).await.unwrap(), 2);

        // el registro 2 desaparece de la tabla, el id no vuelve a salir
        store.save(Table::Customers, &[json!({"id": 1})]).await.unwrap();
        assert_eq!(store.next_id(Table::Customers).await.unwrap(), 3);

        // otras tablas tienen su propia secuencia
        assert_eq!(store.next_ids(Table::Vehicles, 2).await.unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_ids_follow_existing_rows() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir).await;
        store
            .save(Table::Destinations, &[json!({"id": 40}), json!({"id": 7})])
            .await
            .unwrap();

        assert_eq!(store.next_id(Table::Destinations).await.unwrap(), 41);
    }
}
