//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the EntryStore trait.

use crate::state::AmvState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{EntryStore, StorageError, StorageResult};
use crate::storage::{compare_for_listing, AmvRecord};
use crate::AmvError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// The parent directory is created if it does not exist yet.
    pub fn new(path: &Path) -> Result<Self, AmvError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, AmvError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Maps an `amvs` row (id, article_url, torrentfile, state) to a record
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AmvRecord> {
    let raw_state: i64 = row.get(3)?;
    let state = AmvState::from_db_int(raw_state)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, raw_state))?;

    Ok(AmvRecord {
        id: row.get(0)?,
        article_url: row.get(1)?,
        file_reference: row.get(2)?,
        state,
    })
}

impl EntryStore for SqliteStorage {
    fn insert_if_absent(&mut self, id: &str, article_url: &str) -> StorageResult<bool> {
        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO amvs (id, article_url, state) VALUES (?1, ?2, ?3)",
            params![id, article_url, AmvState::Discovered.to_db_int()],
        )?;
        tx.commit()?;
        Ok(inserted > 0)
    }

    fn set_state(&mut self, id: &str, state: AmvState) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let current: Option<i64> = tx
            .query_row("SELECT state FROM amvs WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        let current = current.ok_or_else(|| StorageError::AmvNotFound(id.to_string()))?;

        if let Some(from) = AmvState::from_db_int(current) {
            if from != state && !from.can_transition_to(state) {
                tracing::warn!("AMV {} moved backwards or skipped: {} -> {}", id, from, state);
            }
        }

        tx.execute(
            "UPDATE amvs SET state = ?1 WHERE id = ?2",
            params![state.to_db_int(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn set_file_reference(&mut self, id: &str, reference: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE amvs SET torrentfile = ?1 WHERE id = ?2",
            params![reference, id],
        )?;
        if updated == 0 {
            return Err(StorageError::AmvNotFound(id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    fn mark_ready(&mut self, id: &str, reference: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let current: Option<i64> = tx
            .query_row("SELECT state FROM amvs WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        let current = current.ok_or_else(|| StorageError::AmvNotFound(id.to_string()))?;
        let from = AmvState::from_db_int(current)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(0, current))?;

        if from != AmvState::Ready && !from.can_transition_to(AmvState::Ready) {
            return Err(StorageError::InvalidTransition {
                id: id.to_string(),
                from,
                to: AmvState::Ready,
            });
        }

        tx.execute(
            "UPDATE amvs SET torrentfile = ?1 WHERE id = ?2",
            params![reference, id],
        )?;

        tx.execute(
            "UPDATE amvs SET state = ?1 WHERE id = ?2",
            params![AmvState::Ready.to_db_int(), id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get(&self, id: &str) -> StorageResult<Option<AmvRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, article_url, torrentfile, state FROM amvs WHERE id = ?1",
                params![id],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn list(&self, state: Option<AmvState>) -> StorageResult<Vec<AmvRecord>> {
        let mut records = match state {
            Some(state) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, article_url, torrentfile, state FROM amvs WHERE state = ?1",
                )?;
                let rows = stmt
                    .query_map(params![state.to_db_int()], record_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT id, article_url, torrentfile, state FROM amvs")?;
                let rows = stmt
                    .query_map([], record_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        records.sort_by(|a, b| compare_for_listing(&a.id, &b.id));
        Ok(records)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM amvs WHERE id = ?1 LIMIT 1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn count_by_state(&self, state: AmvState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM amvs WHERE state = ?1",
            params![state.to_db_int()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM amvs", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
