//! Repositorio genérico sobre una tabla JSON
//!
//! Cada operación carga la tabla entera y, si escribe, la persiste entera.
//! Las escrituras deben hacerse con el `write_guard` del store tomado.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::database::JsonStore;
use crate::models::Record;
use crate::services::lifecycle::{self, Transition};
use crate::utils::errors::{not_found_error, AppResult};

pub struct TableRepository<T: Record> {
    store: Arc<JsonStore>,
    _record: PhantomData<T>,
}

impl<T: Record> Clone for TableRepository<T> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<T: Record> TableRepository<T> {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub async fn load(&self) -> AppResult<Vec<T>> {
        self.store.load(T::TABLE).await
    }

    pub async fn save(&self, records: &[T]) -> AppResult<()> {
        self.store.save(T::TABLE, records).await
    }

    pub async fn find_by_id(&self, id: u64) -> AppResult<Option<T>> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|r| r.id() == id))
    }

    /// Como `find_by_id` pero un registro ausente es NotFound
    pub async fn get(&self, id: u64) -> AppResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(T::RESOURCE, id))
    }

    /// Existe y no ha sido borrado definitivamente (puede estar inactivo)
    pub async fn exists(&self, id: u64) -> AppResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Insertar asignando un identificador nuevo
    pub async fn insert(&self, mut record: T) -> AppResult<T> {
        let id = self.store.next_id(T::TABLE).await?;
        record.assign_id(id);

        let mut records = self.load().await?;
        records.push(record.clone());
        self.save(&records).await?;

        tracing::info!("✅ {} {} creado", T::RESOURCE, id);
        Ok(record)
    }

    /// Insertar varios registros en una sola escritura de la tabla
    pub async fn insert_many(&self, mut batch: Vec<T>) -> AppResult<Vec<T>> {
        let ids = self.store.next_ids(T::TABLE, batch.len()).await?;
        for (record, id) in batch.iter_mut().zip(ids) {
            record.assign_id(id);
        }

        let mut records = self.load().await?;
        records.extend(batch.iter().cloned());
        self.save(&records).await?;

        tracing::info!("✅ {} registros de {} creados", batch.len(), T::RESOURCE);
        Ok(batch)
    }

    /// Borrado lógico; devuelve si hubo cambio
    pub async fn soft_delete(&self, id: u64) -> AppResult<(T, Transition)> {
        let mut record = self.get(id).await?;
        let transition = lifecycle::soft_delete(&mut record);
        if transition == Transition::Applied {
            self.replace(record.clone()).await?;
            tracing::info!("🗃️  {} {} desactivado", T::RESOURCE, id);
        }
        Ok((record, transition))
    }

    pub async fn reactivate(&self, id: u64) -> AppResult<T> {
        let mut record = self.get(id).await?;
        lifecycle::reactivate(&mut record)?;
        self.replace(record.clone()).await?;
        tracing::info!("♻️  {} {} reactivado", T::RESOURCE, id);
        Ok(record)
    }

    /// Sustituir un registro existente tal cual llega
    pub async fn replace(&self, record: T) -> AppResult<T> {
        let mut records = self.load().await?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| not_found_error(T::RESOURCE, record.id()))?;
        *slot = record.clone();
        self.save(&records).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::models::{Customer, RecordMeta};
    use crate::utils::errors::AppError;
    use tempfile::TempDir;

    async fn repository(dir: &TempDir) -> TableRepository<Customer> {
        let store = JsonStore::new(&StorageConfig::new(dir.path()));
        store.init().await.unwrap();
        TableRepository::new(Arc::new(store))
    }

    fn customer(name: &str) -> Customer {
        Customer {
            id: 0,
            name: name.to_string(),
            email: None,
            phone: None,
            meta: RecordMeta::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir).await;

        let a = repo.insert(customer("A")).await.unwrap();
        let batch = repo.insert_many(vec![customer("B"), customer("C")]).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(batch.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(repo.load().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_and_replace() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir).await;

        let mut stored = repo.insert(customer("A")).await.unwrap();
        stored.name = "Alba".to_string();
        repo.replace(stored).await.unwrap();

        assert_eq!(repo.get(1).await.unwrap().name, "Alba");
        assert!(matches!(repo.get(99).await, Err(AppError::NotFound(_))));
        assert!(!repo.exists(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_soft_delete_and_reactivate() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir).await;
        repo.insert(customer("A")).await.unwrap();

        let (record, transition) = repo.soft_delete(1).await.unwrap();
        assert_eq!(transition, Transition::Applied);
        assert!(!record.meta.is_active());

        let (_, transition) = repo.soft_delete(1).await.unwrap();
        assert_eq!(transition, Transition::Unchanged);
        assert!(!repo.get(1).await.unwrap().meta.is_active());

        assert!(repo.reactivate(1).await.unwrap().meta.is_active());
        assert!(matches!(repo.reactivate(1).await, Err(AppError::InvalidTransition(_))));
    }
}
