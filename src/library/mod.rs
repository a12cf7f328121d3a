//! Library scan
//!
//! Finds AMVs that are already in the local video collection and marks them
//! COLLECTED. Collection files are named after the AMV id, e.g.
//! `12345.Some Title.mkv`.

use crate::state::AmvState;
use crate::storage::{normalize_id, EntryStore};
use crate::AmvError;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Source of ids present in the collection
pub trait LibraryScanner {
    /// Returns the ids found, in file-name order and without duplicates
    fn scan(&self) -> Result<Vec<String>, AmvError>;
}

/// Scans one directory for files whose names start with a fixed-width id
#[derive(Debug)]
pub struct DirectoryScanner {
    path: PathBuf,
    pattern: Regex,
}

impl DirectoryScanner {
    /// Creates a scanner for ids of exactly `id_width` digits
    pub fn new(path: impl Into<PathBuf>, id_width: usize) -> Result<Self, AmvError> {
        let pattern = Regex::new(&format!(r"^(\d{{{}}})\.", id_width))
            .map_err(|e| crate::ConfigError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            path: path.into(),
            pattern,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extracts the id from a file name, if it has one
    pub fn id_from_file_name(&self, name: &str) -> Option<String> {
        self.pattern.captures(name).map(|caps| caps[1].to_string())
    }
}

impl LibraryScanner for DirectoryScanner {
    fn scan(&self) -> Result<Vec<String>, AmvError> {
        let mut names = BTreeSet::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_string());
            }
        }

        let mut seen = BTreeSet::new();
        let mut ids = Vec::new();
        for name in &names {
            if let Some(id) = self.id_from_file_name(name) {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        tracing::debug!(
            "{} of {} files in {} carry an id",
            ids.len(),
            names.len(),
            self.path.display()
        );
        Ok(ids)
    }
}

/// Outcome of marking collected AMVs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Ids found in the collection
    pub found: usize,
    /// Ids marked COLLECTED
    pub marked: usize,
    /// Ids with no database record
    pub skipped: usize,
}

/// Marks every found id that exists in the store as COLLECTED
///
/// An id is looked up as written first, then with leading zeros stripped,
/// so `01234.mkv` matches an AMV stored as `1234`.
pub fn mark_collected(store: &mut dyn EntryStore, ids: &[String]) -> Result<ScanReport, AmvError> {
    let mut report = ScanReport {
        found: ids.len(),
        ..Default::default()
    };

    for id in ids {
        let target = if store.exists(id)? {
            Some(id.clone())
        } else {
            let normalized = normalize_id(id);
            if normalized != *id && store.exists(&normalized)? {
                Some(normalized)
            } else {
                None
            }
        };

        match target {
            Some(target) => {
                store.set_state(&target, AmvState::Collected)?;
                tracing::debug!("AMV {} marked as collected", target);
                report.marked += 1;
            }
            None => {
                tracing::warn!("AMV {} is in the library but not in the database", id);
                report.skipped += 1;
            }
        }
    }

    tracing::info!(
        "Library scan: {} found, {} marked collected, {} unknown",
        report.found,
        report.marked,
        report.skipped
    );

    Ok(report)
}

/// Scans the collection and marks what it finds
pub fn check_library(
    store: &mut dyn EntryStore,
    scanner: &dyn LibraryScanner,
) -> Result<ScanReport, AmvError> {
    let ids = scanner.scan()?;
    mark_collected(store, &ids)
}
