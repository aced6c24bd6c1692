//! Store errors
//!
//! One error type for every fallible operation. Lookups that miss (table,
//! index, key/value) are `NotFound`; nothing is signaled through status pairs.

use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Broad classification of a [`StoreError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing table, index out of range, or no record matched
    NotFound,
    /// Input that cannot be stored as a record
    InvalidInput,
    /// The backing file no longer holds a valid document
    Corrupt,
    /// Filesystem failure or a failed background task
    Io,
    /// Document could not be serialized
    Serialize,
    /// Bad configuration value
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Corrupt => "corrupt",
            ErrorKind::Io => "io",
            ErrorKind::Serialize => "serialize",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}

/// Store error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Table '{table}' does not exist")]
    TableNotFound { table: String },

    #[error("Data at index {index} does not exist in table '{table}'")]
    IndexOutOfRange { table: String, index: usize },

    #[error("Record with {key} = {} not found in table '{table}'.", display_value(.value))]
    RecordNotFound {
        table: String,
        key: String,
        value: Value,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Corrupt document at {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::TableNotFound { .. }
            | StoreError::IndexOutOfRange { .. }
            | StoreError::RecordNotFound { .. } => ErrorKind::NotFound,
            StoreError::InvalidRecord(_) => ErrorKind::InvalidInput,
            StoreError::Corrupt { .. } => ErrorKind::Corrupt,
            StoreError::Io(_) | StoreError::Task(_) => ErrorKind::Io,
            StoreError::Serialize(_) => ErrorKind::Serialize,
            StoreError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Flatten a result into a `(message, ok)` pair.
    ///
    /// For callers that only want to print the outcome of a mutation.
    pub fn status<T: fmt::Display>(result: &Result<T>) -> (String, bool) {
        match result {
            Ok(value) => (value.to_string(), true),
            Err(e) => (e.to_string(), false),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Render a value the way it reads in messages: strings bare, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
