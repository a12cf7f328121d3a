//! Human-formatted file size parsing

use regex::Regex;
use std::sync::LazyLock;

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(mb|gb|мб|гб)").expect("size regex is valid")
});

const MB_PER_GB: f64 = 1024.0;

/// Parses a size such as `"1.5 Gb"` or `"394.2 Мб"` into megabytes
///
/// Units are MB and GB in Latin or Cyrillic spelling, any case. A comma
/// works as the decimal separator. Text without a recognised size gives 0.0.
///
/// # Example
///
/// ```
/// use amv_harvest::resolver::parse_size_mb;
///
/// assert_eq!(parse_size_mb("1.5 Gb"), 1536.0);
/// assert_eq!(parse_size_mb("(140.99 Mb)"), 140.99);
/// assert_eq!(parse_size_mb("unknown"), 0.0);
/// ```
pub fn parse_size_mb(text: &str) -> f64 {
    let Some(caps) = SIZE_PATTERN.captures(text) else {
        return 0.0;
    };

    let Ok(value) = caps[1].replace(',', ".").parse::<f64>() else {
        return 0.0;
    };

    match caps[2].to_lowercase().as_str() {
        "gb" | "гб" => value * MB_PER_GB,
        _ => value,
    }
}
