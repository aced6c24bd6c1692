//! File-backed record store
//!
//! Every call reads the whole file, operates on the parsed document, and on
//! success of a mutation rewrites the whole file. Nothing is cached between
//! calls, so each call costs O(document size) and always sees what is on
//! disk.
//!
//! Concurrency:
//! - Calls on the same path from this process are serialized by a shared
//!   path lock (see [`crate::lock`]), unless `StoreConfig::lock` is off.
//! - Separate processes writing the same file can still lose updates.
//! - Writes overwrite in place; a crash mid-write can leave a truncated file,
//!   which the next `open` resets to an empty document.

use jsondb_core::{
    type_name, Confirmation, Document, Record, Result, StoreConfig, StoreError, Table, Value,
};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::MutexGuard;
use tracing::{debug, info, warn};

use crate::codec;
use crate::lock::{self, PathLock};

/// JSON file store
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    indent: usize,
    lock: Option<PathLock>,
}

impl Store {
    /// Open (or create) a store at `path` with default settings.
    ///
    /// A missing file, a file that is not JSON, or a file whose root is not a
    /// JSON object is replaced with an empty document. That reset is logged
    /// at `warn` and is not reported as an error; the previous contents are
    /// lost. An object whose values are not all tables is left as it is and
    /// surfaces as [`StoreError::Corrupt`] on first use. Fails only if the
    /// file cannot be read or written.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(StoreConfig::new(path))
    }

    pub fn open_with(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let lock = config.lock.then(|| lock::lock_for(&config.path));
        let store = Self {
            path: config.path,
            indent: config.indent,
            lock,
        };

        {
            let _guard = store.guard();
            store.ensure_document()?;
        }

        info!("JSON store opened at: {:?}", store.path);
        Ok(store)
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Option<MutexGuard<'_, ()>> {
        self.lock.as_ref().map(lock::acquire)
    }

    fn ensure_document(&self) -> Result<()> {
        match fs::read_to_string(&self.path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(_)) => {
                    if let Err(e) = codec::decode(&text) {
                        debug!("Keeping document with foreign values at {:?}: {}", self.path, e);
                    }
                    return Ok(());
                }
                Ok(other) => warn!(
                    "Resetting document with {} root at {:?}",
                    type_name(&other),
                    self.path
                ),
                Err(e) => warn!("Resetting invalid document at {:?}: {}", self.path, e),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Creating empty document at {:?}", self.path);
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!("Resetting unreadable document at {:?}: {}", self.path, e);
            }
            Err(e) => return Err(e.into()),
        }
        self.save(&Document::new())
    }

    fn load(&self) -> Result<Document> {
        let text = fs::read_to_string(&self.path)?;
        codec::decode(&text).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, doc: &Document) -> Result<()> {
        let bytes = codec::encode_pretty(doc, self.indent)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Run a read-only operation against the current document.
    fn read<T>(&self, op: impl FnOnce(&Document) -> T) -> Result<T> {
        let _guard = self.guard();
        let doc = self.load()?;
        Ok(op(&doc))
    }

    /// Load, apply `op`, and persist if it succeeded. Failed operations leave
    /// the file untouched.
    fn mutate<T>(&self, op: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let _guard = self.guard();
        let mut doc = self.load()?;
        let out = op(&mut doc)?;
        self.save(&doc)?;
        Ok(out)
    }

    // ============ Tables ============

    /// Ensure `table` exists; existing contents are kept.
    pub fn create_table(&self, table: &str) -> Result<&Self> {
        let created = self.mutate(|doc| Ok(doc.create_table(table)))?;
        if created {
            debug!("Created table '{}'", table);
        }
        Ok(self)
    }

    /// Records of `table`, empty if it does not exist.
    pub fn get_table(&self, table: &str) -> Result<Table> {
        self.read(|doc| doc.records(table).to_vec())
    }

    /// Table names in document order
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.read(Document::table_names)
    }

    /// Number of records in `table`, 0 if it does not exist.
    pub fn len(&self, table: &str) -> Result<usize> {
        self.read(|doc| doc.records(table).len())
    }

    /// Empty `table`. An absent table is not an error.
    pub fn clear_table(&self, table: &str) -> Result<Confirmation> {
        let existed = self.mutate(|doc| Ok(doc.clear_table(table)))?;
        debug!("Cleared table '{}' (existed: {})", table, existed);
        Ok(Confirmation::Cleared {
            table: table.to_string(),
        })
    }

    // ============ Records ============

    /// Append `fields` to `table`, creating the table if needed.
    pub fn add_record(&self, table: &str, fields: Record) -> Result<&Self> {
        self.mutate(|doc| {
            doc.add_record(table, fields);
            Ok(())
        })?;
        debug!("Added record to '{}'", table);
        Ok(self)
    }

    pub fn get_record(&self, table: &str, index: usize) -> Result<Option<Record>> {
        self.read(|doc| doc.get_record(table, index).cloned())
    }

    /// Remove the record at `index`; later records shift down by one.
    pub fn delete_record(&self, table: &str, index: usize) -> Result<Confirmation> {
        self.mutate(|doc| doc.delete_record(table, index))?;
        debug!("Deleted record {} from '{}'", index, table);
        Ok(Confirmation::Deleted {
            table: table.to_string(),
            index,
        })
    }

    /// Merge `fields` into the record at `index`, keeping untouched keys.
    pub fn update_record(&self, table: &str, index: usize, fields: Record) -> Result<Confirmation> {
        self.mutate(|doc| doc.update_record(table, index, fields))?;
        debug!("Updated record {} in '{}'", index, table);
        Ok(Confirmation::Updated {
            table: table.to_string(),
            index,
        })
    }

    /// Set `key` to `new_value` on the first record where `key == old_value`.
    pub fn update_where(
        &self,
        table: &str,
        key: &str,
        old_value: &Value,
        new_value: Value,
    ) -> Result<&Self> {
        let index = self.mutate(|doc| doc.update_where(table, key, old_value, new_value))?;
        debug!("Updated '{}' on record {} in '{}'", key, index, table);
        Ok(self)
    }

    /// Whether some record in `table` matches every field of `fields`.
    pub fn record_exists(&self, table: &str, fields: &Record) -> Result<bool> {
        self.read(|doc| doc.record_exists(table, fields))
    }

    /// All records, from any table, whose `key` equals `value`.
    pub fn find_by_field(&self, key: &str, value: &Value) -> Result<Vec<Record>> {
        self.read(|doc| doc.find_by_field(key, value))
    }

    // ============ Whole document ============

    pub fn get_all(&self) -> Result<Document> {
        self.read(Document::clone)
    }

    /// Replace the document with a compact `{}`.
    pub fn clear_all(&self) -> Result<()> {
        let _guard = self.guard();
        fs::write(&self.path, codec::EMPTY_COMPACT)?;
        info!("Cleared all tables in {:?}", self.path);
        Ok(())
    }

    /// Remove the backing file. Other handles on the same path will fail
    /// with an IO error afterwards; nothing recreates the file.
    pub fn destroy(self) -> Result<()> {
        let _guard = self.guard();
        fs::remove_file(&self.path)?;
        info!("Destroyed JSON store at {:?}", self.path);
        Ok(())
    }
}
