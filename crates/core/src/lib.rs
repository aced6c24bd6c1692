//! JsonDB Core - data model shared by every storage backend
//!
//! - Document / Table / Record: the persisted shape
//! - StoreError: the single error type
//! - StoreConfig: file, indent and locking options

mod config;
mod document;
mod error;

pub use config::*;
pub use document::*;
pub use error::*;

pub use serde_json::{json, Value};
