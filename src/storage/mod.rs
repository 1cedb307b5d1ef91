//! Storage module for local persistent state
//!
//! This module stands in for browser local storage:
//! - SQLite-backed key/value persistence across runs
//! - An in-memory variant for ephemeral sessions and tests

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{KeyValueStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the key/value store at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}
