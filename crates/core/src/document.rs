//! Document model
//!
//! A document maps table names to tables; a table is an ordered list of
//! records; a record is an ordered JSON object. Every store operation is
//! implemented here against the in-memory document so the file store and the
//! memory storage share one behavior.
//!
//! Indices are positions, not identifiers: deleting index `i` shifts every
//! record after it down by one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

use crate::error::{Result, StoreError};

/// A single record: field name to JSON value, in insertion order.
pub type Record = Map<String, Value>;

/// An ordered sequence of records.
pub type Table = Vec<Record>;

/// Convert a JSON value into a record. Only objects are records.
pub fn into_record(value: Value) -> Result<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// JSON type name of `value`, for messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field lookup where an absent field reads as `null`.
fn field<'a>(record: &'a Record, key: &str) -> &'a Value {
    record.get(key).unwrap_or(&Value::Null)
}

/// JSON equality, except numbers compare by value: `1` equals `1.0`.
/// Arrays and objects compare element by element with the same rule.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Whether `record` carries every field of `fields` with an equal value.
pub fn matches(record: &Record, fields: &Record) -> bool {
    fields.iter().all(|(k, v)| values_equal(field(record, k), v))
}

/// Successful outcome of a lookup-based mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Deleted { table: String, index: usize },
    Updated { table: String, index: usize },
    Cleared { table: String },
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confirmation::Deleted { table, index } => {
                write!(f, "Data at index {} deleted from table '{}'", index, table)
            }
            Confirmation::Updated { table, index } => write!(
                f,
                "Data at index {} updated successfully in table '{}'",
                index, table
            ),
            Confirmation::Cleared { table } => {
                write!(f, "All data in '{}' table has been deleted.", table)
            }
        }
    }
}

/// The whole database: table name to table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    tables: IndexMap<String, Table>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Table names in document order
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Records of `table`; an absent table reads as empty.
    pub fn records(&self, table: &str) -> &[Record] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_record(&self, table: &str, index: usize) -> Option<&Record> {
        self.tables.get(table)?.get(index)
    }

    /// Ensure `table` exists. Returns `true` if it was created.
    pub fn create_table(&mut self, table: &str) -> bool {
        if self.tables.contains_key(table) {
            return false;
        }
        self.tables.insert(table.to_string(), Table::new());
        true
    }

    /// Append a record, creating the table on first write.
    pub fn add_record(&mut self, table: &str, record: Record) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .push(record);
    }

    fn table_mut(&mut self, table: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })
    }

    fn record_mut(&mut self, table: &str, index: usize) -> Result<&mut Record> {
        self.table_mut(table)?
            .get_mut(index)
            .ok_or_else(|| StoreError::IndexOutOfRange {
                table: table.to_string(),
                index,
            })
    }

    /// Remove the record at `index`, shifting later records down.
    pub fn delete_record(&mut self, table: &str, index: usize) -> Result<Record> {
        let records = self.table_mut(table)?;
        if index >= records.len() {
            return Err(StoreError::IndexOutOfRange {
                table: table.to_string(),
                index,
            });
        }
        Ok(records.remove(index))
    }

    /// Shallow-merge `fields` into the record at `index`.
    pub fn update_record(&mut self, table: &str, index: usize, fields: Record) -> Result<()> {
        let record = self.record_mut(table, index)?;
        for (key, value) in fields {
            record.insert(key, value);
        }
        Ok(())
    }

    /// Set `key` to `new_value` on the first record whose `key` equals
    /// `old_value`. Returns the index of the updated record.
    pub fn update_where(
        &mut self,
        table: &str,
        key: &str,
        old_value: &Value,
        new_value: Value,
    ) -> Result<usize> {
        let records = self.table_mut(table)?;
        let index = records
            .iter()
            .position(|record| values_equal(field(record, key), old_value))
            .ok_or_else(|| StoreError::RecordNotFound {
                table: table.to_string(),
                key: key.to_string(),
                value: old_value.clone(),
            })?;
        records[index].insert(key.to_string(), new_value);
        Ok(index)
    }

    pub fn record_exists(&self, table: &str, fields: &Record) -> bool {
        self.records(table).iter().any(|record| matches(record, fields))
    }

    /// Records from every table whose `key` equals `value`, table by table.
    pub fn find_by_field(&self, key: &str, value: &Value) -> Vec<Record> {
        self.tables
            .values()
            .flatten()
            .filter(|record| values_equal(field(record, key), value))
            .cloned()
            .collect()
    }

    /// Empty `table` if present. Returns `true` if the table existed.
    pub fn clear_table(&mut self, table: &str) -> bool {
        match self.tables.get_mut(table) {
            Some(records) => {
                records.clear();
                true
            }
            None => false,
        }
    }

    /// Drop every table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
