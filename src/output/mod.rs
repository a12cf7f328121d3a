//! Output module for console reports
//!
//! This module handles:
//! - Lifecycle statistics for the `stats` command
//! - Record listings for the `list` command

mod records;
pub mod stats;

pub use records::{format_record, format_records, print_records};
pub use stats::{format_statistics, load_statistics, print_statistics, StoreStatistics};
