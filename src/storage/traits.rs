//! Storage traits and error types
//!
//! This module defines the trait interface for the entry store and the
//! associated error types.

use crate::state::AmvState;
use crate::storage::AmvRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("AMV not found: {0}")]
    AmvNotFound(String),

    #[error("AMV {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: AmvState,
        to: AmvState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for entry store implementations
///
/// The entry store is the single source of truth for every known AMV. Every
/// mutating method runs as its own transaction: it either applies fully or
/// leaves the store unchanged. Implementations assume a single writer.
pub trait EntryStore {
    /// Inserts a newly discovered AMV unless the id is already known
    ///
    /// An existing record is never touched: neither its article URL nor its
    /// state changes.
    ///
    /// # Returns
    ///
    /// `true` if a record was created, `false` if the id already existed
    fn insert_if_absent(&mut self, id: &str, article_url: &str) -> StorageResult<bool>;

    /// Overwrites the state of an AMV
    ///
    /// Returns `StorageError::AmvNotFound` if the id is unknown.
    fn set_state(&mut self, id: &str, state: AmvState) -> StorageResult<()>;

    /// Sets the stored torrent file name of an AMV
    ///
    /// Returns `StorageError::AmvNotFound` if the id is unknown.
    fn set_file_reference(&mut self, id: &str, reference: &str) -> StorageResult<()>;

    /// Records a stored torrent and advances the AMV to `Ready`
    ///
    /// The file reference is written first, then the state, both in one
    /// transaction, so a reader never sees one without the other. Only a
    /// DISCOVERED or READY AMV can be marked; anything further along gives
    /// `StorageError::InvalidTransition` and is left unchanged.
    fn mark_ready(&mut self, id: &str, reference: &str) -> StorageResult<()>;

    /// Gets an AMV by id
    fn get(&self, id: &str) -> StorageResult<Option<AmvRecord>>;

    /// Lists AMVs, optionally restricted to one state
    ///
    /// Records are ordered by numeric id, highest first. Ids without a
    /// numeric value come last, ordered by their text.
    fn list(&self, state: Option<AmvState>) -> StorageResult<Vec<AmvRecord>>;

    /// Checks whether an id is known
    fn exists(&self, id: &str) -> StorageResult<bool>;

    // ===== Statistics =====

    /// Counts AMVs in a state
    fn count_by_state(&self, state: AmvState) -> StorageResult<u64>;

    /// Counts all AMVs
    fn count_total(&self) -> StorageResult<u64>;
}
