//! Statistics generation from the AMV database
//!
//! This module provides functionality for extracting and displaying
//! lifecycle statistics from the storage layer.

use crate::state::AmvState;
use crate::storage::EntryStore;
use crate::AmvError;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Lifecycle statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStatistics {
    /// Total number of AMVs known
    pub total: u64,

    /// Count of AMVs per state, every state present
    pub by_state: BTreeMap<AmvState, u64>,
}

impl StoreStatistics {
    pub fn count(&self, state: AmvState) -> u64 {
        self.by_state.get(&state).copied().unwrap_or(0)
    }

    /// Share of all AMVs in `state`, in percent
    pub fn percentage(&self, state: AmvState) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.count(state) as f64 / self.total as f64) * 100.0
    }
}

/// Loads statistics from storage
pub fn load_statistics(store: &dyn EntryStore) -> Result<StoreStatistics, AmvError> {
    let total = store.count_total()?;

    let mut by_state = BTreeMap::new();
    for state in AmvState::all_states() {
        by_state.insert(state, store.count_by_state(state)?);
    }

    Ok(StoreStatistics { total, by_state })
}

/// Renders statistics as the text block printed by `stats`
pub fn format_statistics(stats: &StoreStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== AMV Statistics ===\n");
    let _ = writeln!(out, "Total AMVs: {}\n", stats.total);
    let _ = writeln!(out, "By State:");

    for state in AmvState::all_states() {
        let _ = writeln!(
            out,
            "  [{}] {:<15} {:>6} ({:.1}%)",
            state.to_db_int(),
            state.label(),
            stats.count(state),
            stats.percentage(state)
        );
    }

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &StoreStatistics) {
    print!("{}", format_statistics(stats));
}
