//! Storage trait definition
//!
//! Async interface over table and record operations

use async_trait::async_trait;
use jsondb_core::{Confirmation, Document, Record, Result, Table, Value};
use std::sync::Arc;

/// Storage trait for table and record persistence
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_table(&self, table: &str) -> Result<()>;
    async fn add_record(&self, table: &str, fields: Record) -> Result<()>;
    async fn delete_record(&self, table: &str, index: usize) -> Result<Confirmation>;
    async fn update_record(&self, table: &str, index: usize, fields: Record) -> Result<Confirmation>;
    async fn update_where(
        &self,
        table: &str,
        key: &str,
        old_value: Value,
        new_value: Value,
    ) -> Result<()>;
    async fn get_table(&self, table: &str) -> Result<Table>;
    async fn record_exists(&self, table: &str, fields: Record) -> Result<bool>;
    async fn find_by_field(&self, key: &str, value: Value) -> Result<Vec<Record>>;
    async fn clear_table(&self, table: &str) -> Result<Confirmation>;
    async fn table_names(&self) -> Result<Vec<String>>;
    async fn get_all(&self) -> Result<Document>;
    async fn clear_all(&self) -> Result<()>;

    /// Drop the backing data. File storage removes its file; later calls fail.
    async fn destroy(&self) -> Result<()>;
}

/// Shared storage reference
pub type SharedStorage = Arc<dyn Storage>;
