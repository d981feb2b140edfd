//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - employees(id, name, department, salary, <runtime-added text columns>)

pub mod schema;
pub mod sqlite;

pub use schema::SchemaRegistry;
pub use sqlite::{RecordStore, StoreStats};
