//! JSON file storage
//!
//! Async wrapper around [`Store`]. Each call runs the blocking
//! read-modify-write cycle on tokio's blocking pool.

use async_trait::async_trait;
use jsondb_core::{Confirmation, Document, Record, Result, StoreConfig, StoreError, Table, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::store::Store;
use crate::trait_::{SharedStorage, Storage};

/// File-backed storage implementation
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    store: Store,
}

impl JsonFileStorage {
    pub async fn open(config: StoreConfig) -> Result<Self> {
        let store = run_blocking(move || Store::open_with(config)).await?;
        info!("JSON file storage ready at: {:?}", store.path());
        Ok(Self { store })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Store) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        run_blocking(move || f(&store)).await
    }
}

/// Run a blocking store call off the async runtime
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

impl From<Store> for JsonFileStorage {
    fn from(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn create_table(&self, table: &str) -> Result<()> {
        let table = table.to_string();
        self.with_store(move |s| s.create_table(&table).map(|_| ()))
            .await
    }

    async fn add_record(&self, table: &str, fields: Record) -> Result<()> {
        let table = table.to_string();
        self.with_store(move |s| s.add_record(&table, fields).map(|_| ()))
            .await
    }

    async fn delete_record(&self, table: &str, index: usize) -> Result<Confirmation> {
        let table = table.to_string();
        self.with_store(move |s| s.delete_record(&table, index))
            .await
    }

    async fn update_record(&self, table: &str, index: usize, fields: Record) -> Result<Confirmation> {
        let table = table.to_string();
        self.with_store(move |s| s.update_record(&table, index, fields))
            .await
    }

    async fn update_where(
        &self,
        table: &str,
        key: &str,
        old_value: Value,
        new_value: Value,
    ) -> Result<()> {
        let table = table.to_string();
        let key = key.to_string();
        self.with_store(move |s| {
            s.update_where(&table, &key, &old_value, new_value)
                .map(|_| ())
        })
        .await
    }

    async fn get_table(&self, table: &str) -> Result<Table> {
        let table = table.to_string();
        self.with_store(move |s| s.get_table(&table)).await
    }

    async fn record_exists(&self, table: &str, fields: Record) -> Result<bool> {
        let table = table.to_string();
        self.with_store(move |s| s.record_exists(&table, &fields))
            .await
    }

    async fn find_by_field(&self, key: &str, value: Value) -> Result<Vec<Record>> {
        let key = key.to_string();
        self.with_store(move |s| s.find_by_field(&key, &value))
            .await
    }

    async fn clear_table(&self, table: &str) -> Result<Confirmation> {
        let table = table.to_string();
        self.with_store(move |s| s.clear_table(&table)).await
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        self.with_store(Store::table_names).await
    }

    async fn get_all(&self) -> Result<Document> {
        self.with_store(Store::get_all).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.with_store(Store::clear_all).await
    }

    async fn destroy(&self) -> Result<()> {
        self.with_store(|s| s.clone().destroy()).await
    }
}

/// Open a file storage from `config` as a shared handle
pub async fn create_file_storage(config: StoreConfig) -> Result<SharedStorage> {
    Ok(Arc::new(JsonFileStorage::open(config).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsondb_core::{into_record, json, ErrorKind};
    use tempfile::TempDir;

    fn rec(value: Value) -> Record {
        into_record(value).unwrap()
    }

    #[tokio::test]
    async fn test_file_storage_persists() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path().join("db.json"));
        let storage = create_file_storage(config.clone()).await.unwrap();

        storage
            .add_record("users", rec(json!({"name": "Alice"})))
            .await
            .unwrap();
        storage
            .update_where("users", "name", json!("Alice"), json!("Alicia"))
            .await
            .unwrap();

        let reopened = Store::open_with(config).unwrap();
        assert_eq!(
            reopened.get_table("users").unwrap(),
            vec![rec(json!({"name": "Alicia"}))]
        );
    }

    #[tokio::test]
    async fn test_file_storage_errors_pass_through() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::open(StoreConfig::new(dir.path().join("db.json")))
            .await
            .unwrap();

        let err = storage.delete_record("ghost", 0).await.unwrap_err();
        assert_eq!(err.to_string(), "Table 'ghost' does not exist");
        assert!(!storage.record_exists("ghost", Record::new()).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_storage_concurrent_adds() {
        let dir = TempDir::new().unwrap();
        let storage = create_file_storage(StoreConfig::new(dir.path().join("db.json")))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let storage = Arc::clone(&storage);
            handles.push(tokio::spawn(async move {
                storage.add_record("t", rec(json!({"i": i}))).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        assert_eq!(storage.get_table("t").await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_file_storage_destroy() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::open(StoreConfig::new(dir.path().join("db.json")))
            .await
            .unwrap();
        let path = storage.path().to_path_buf();

        storage.create_table("t").await.unwrap();
        storage.destroy().await.unwrap();
        assert!(!path.exists());

        let err = storage.get_all().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
