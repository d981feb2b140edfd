//! # Roster - employee records with a runtime-extensible schema
//!
//! Roster provides:
//! - A SQLite-backed record store for employee entries
//! - Additive schema evolution: new free-text attributes at runtime
//! - Filtered scans by department and salary range
//! - CSV export of result sets

pub mod attribute;
pub mod record;
pub mod query;
pub mod storage;
pub mod export;
pub mod config;
pub mod ui;


// Re-exports for convenient access
pub use attribute::{Attribute, AttributeKind};
pub use record::{Record, RecordInput, Value};
pub use query::RecordFilter;
pub use storage::RecordStore;

/// Result type alias for Roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Roster operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller can keep working with the store after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_))
    }
}
