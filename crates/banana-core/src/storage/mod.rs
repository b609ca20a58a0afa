//! Storage layer
//!
//! Everything that touches the store file on disk.
//!
//! ## Layout
//!
//! - **SQLite**: one file, one table per entity type
//! - **Backup copy**: `<store>.bak`, the store as it was before the last import
//!
//! Row-level access goes through [`crate::store::Store`]; the helpers here
//! handle schema creation, structural validation and whole-file writes.

pub mod error;
pub mod persistence;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use persistence::{atomic_write, read_blob, StorageStats};
pub use schema::{ensure_table, validate_store, SQLITE_HEADER};
