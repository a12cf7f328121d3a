//! Storage module for persisting AMV records
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Insert-if-absent discovery of new AMVs
//! - Lifecycle state and torrent reference updates
//! - Ordered listing and per-state counts

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{EntryStore, StorageError, StorageResult};

use crate::state::AmvState;
use crate::AmvError;
use std::cmp::Ordering;
use std::path::Path;

/// Opens (or creates) the entry store at `path`
pub fn open_storage(path: &Path) -> Result<SqliteStorage, AmvError> {
    SqliteStorage::new(path)
}

/// Represents one AMV in the database
#[derive(Debug, Clone, PartialEq)]
pub struct AmvRecord {
    /// Id exactly as the site spells it, leading zeros included
    pub id: String,
    pub article_url: String,
    /// Name of the stored torrent file, set once the AMV is ready
    pub file_reference: Option<String>,
    pub state: AmvState,
}

impl AmvRecord {
    /// Numeric value of the id, if it is all digits
    pub fn numeric_id(&self) -> Option<u64> {
        numeric_id(&self.id)
    }
}

/// Parses an id as an unsigned number
///
/// Leading zeros are accepted; anything that is not purely ASCII digits has
/// no numeric value.
pub fn numeric_id(id: &str) -> Option<u64> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// Strips leading zeros from a numeric id (`"01234"` becomes `"1234"`)
///
/// An all-zero id keeps a single `"0"`. Non-numeric ids are returned as is.
pub fn normalize_id(id: &str) -> String {
    if numeric_id(id).is_none() {
        return id.to_string();
    }
    let trimmed = id.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Listing order: numeric ids descending, then non-numeric ids by text
pub(crate) fn compare_for_listing(a: &str, b: &str) -> Ordering {
    match (numeric_id(a), numeric_id(b)) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
