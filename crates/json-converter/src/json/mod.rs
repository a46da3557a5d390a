//! Thin wrapper over `serde_json` for the converter's parse and serialize steps.
//!
//! The converter never touches `serde_json` directly for document parsing;
//! everything that depends on [`ParseOptions`] goes through here.

pub mod redact;
pub(crate) mod rename;
mod strict;

use serde::Serialize;
use serde_json::Value;

use crate::config::{DuplicateKeys, NamingStrategy, ParseOptions};
use crate::errors::{JsonError, Result};

pub use redact::{Redacted, Redaction, MASK};

/// Parse a request body into a JSON value.
///
/// Returns `Ok(None)` when there is no value: the body is empty, only
/// whitespace, or the literal `null`.
pub fn parse_document(bytes: &[u8], options: &ParseOptions) -> Result<Option<Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value = match options.duplicate_keys {
        DuplicateKeys::TakeLast => serde_json::from_slice::<Value>(bytes),
        DuplicateKeys::Error => serde_json::from_slice::<strict::StrictValue>(bytes).map(|v| v.0),
    }
    .map_err(JsonError::Malformed)?;

    Ok(match value {
        Value::Null => None,
        value => Some(value),
    })
}

/// Convert a value to a `serde_json::Value`, with struct fields spelled per
/// `naming`.
pub fn to_value<T: Serialize>(value: &T, naming: NamingStrategy) -> Result<Value> {
    let tree = if naming.is_identity() {
        serde_json::to_value(value)
    } else {
        rename::to_value(value, naming)
    };
    tree.map_err(JsonError::Serialize)
}

/// Serialize a value straight to a writer, without an intermediate tree.
pub fn to_writer<T: Serialize, W: std::io::Write>(writer: W, value: &T) -> Result<()> {
    serde_json::to_writer(writer, value).map_err(JsonError::Serialize)
}
