//! Record listing for the `list` command

use crate::links::id_from_url;
use crate::storage::AmvRecord;
use std::fmt::Write;

/// Renders one record as a listing line
///
/// The id embedded in the article URL is shown next to the stored id so a
/// mismatch stands out.
pub fn format_record(record: &AmvRecord) -> String {
    let url_id = id_from_url(&record.article_url).unwrap_or_else(|| "-".to_string());
    format!(
        "{:>8}  url-id {:>8}  [{}] {:<15}  {}",
        record.id,
        url_id,
        record.state.to_db_int(),
        record.state.label(),
        record.file_reference.as_deref().unwrap_or("-")
    )
}

/// Renders a full listing with a trailing count
pub fn format_records(records: &[AmvRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "{}", format_record(record));
    }
    let _ = writeln!(out, "\n{} AMVs", records.len());
    out
}

/// Prints records to stdout
pub fn print_records(records: &[AmvRecord]) {
    print!("{}", format_records(records));
}
