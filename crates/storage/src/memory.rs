//! In-memory storage implementation
//!
//! Same semantics as the file store without touching disk

use async_trait::async_trait;
use jsondb_core::{Confirmation, Document, Record, Result, Table, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::trait_::{SharedStorage, Storage};

/// In-memory storage implementation
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Document>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing document
    pub fn with_document(document: Document) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }

    fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_table(&self, table: &str) -> Result<()> {
        self.document().create_table(table);
        Ok(())
    }

    async fn add_record(&self, table: &str, fields: Record) -> Result<()> {
        self.document().add_record(table, fields);
        Ok(())
    }

    async fn delete_record(&self, table: &str, index: usize) -> Result<Confirmation> {
        self.document().delete_record(table, index)?;
        Ok(Confirmation::Deleted {
            table: table.to_string(),
            index,
        })
    }

    async fn update_record(&self, table: &str, index: usize, fields: Record) -> Result<Confirmation> {
        self.document().update_record(table, index, fields)?;
        Ok(Confirmation::Updated {
            table: table.to_string(),
            index,
        })
    }

    async fn update_where(
        &self,
        table: &str,
        key: &str,
        old_value: Value,
        new_value: Value,
    ) -> Result<()> {
        self.document()
            .update_where(table, key, &old_value, new_value)?;
        Ok(())
    }

    async fn get_table(&self, table: &str) -> Result<Table> {
        Ok(self.document().records(table).to_vec())
    }

    async fn record_exists(&self, table: &str, fields: Record) -> Result<bool> {
        Ok(self.document().record_exists(table, &fields))
    }

    async fn find_by_field(&self, key: &str, value: Value) -> Result<Vec<Record>> {
        Ok(self.document().find_by_field(key, &value))
    }

    async fn clear_table(&self, table: &str) -> Result<Confirmation> {
        self.document().clear_table(table);
        Ok(Confirmation::Cleared {
            table: table.to_string(),
        })
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.document().table_names())
    }

    async fn get_all(&self) -> Result<Document> {
        Ok(self.document().clone())
    }

    async fn clear_all(&self) -> Result<()> {
        self.document().clear();
        Ok(())
    }

    async fn destroy(&self) -> Result<()> {
        self.document().clear();
        Ok(())
    }
}

/// Create a new shared in-memory storage
pub fn create_memory_storage() -> SharedStorage {
    Arc::new(MemoryStorage::new())
}
