//! Error taxonomy for the engine.
//!
//! Only ingestion can fail: a batch whose shape does not agree with the
//! caller's key mapping is rejected as a whole. Every other trigger is a total
//! function over the current state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A key mapping names a sub-key for a field whose raw value is not a mapping.
    #[error(
        "record {record}: field '{field}' is mapped to key '{key}' but holds {found}, not a mapping"
    )]
    MalformedKeyMapping {
        record: usize,
        field: String,
        key: String,
        found: &'static str,
    },
    /// A field still holds a nested value after key mapping was applied.
    #[error("record {record}: field '{field}' holds {found} that no key mapping flattens")]
    UnflattenedField {
        record: usize,
        field: String,
        found: &'static str,
    },
    #[error("{0} rows per page is not supported (expected 10, 25, 50 or 100)")]
    UnsupportedPageSize(usize),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
