//! Document encoding
//!
//! Writes are pretty-printed with a fixed indent; `clear_all` writes the
//! compact empty mapping.

use jsondb_core::{Document, StoreError};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Compact empty document
pub const EMPTY_COMPACT: &[u8] = b"{}";

/// Serialize `doc` with `indent` spaces per level.
pub fn encode_pretty(doc: &Document, indent: usize) -> Result<Vec<u8>, StoreError> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    Ok(buf)
}

/// Parse a whole document. Anything but a mapping of arrays of objects fails.
pub fn decode(text: &str) -> Result<Document, serde_json::Error> {
    serde_json::from_str(text)
}
