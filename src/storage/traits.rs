//! Storage traits and error types
//!
//! This module defines the trait interface for the local key/value store and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for local persistent key/value storage
///
/// Values survive process restarts for file-backed implementations. The
/// session keeps its bearer token here.
pub trait KeyValueStore: Send {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Removes every key
    fn clear(&mut self) -> StorageResult<()>;
}
