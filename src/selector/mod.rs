//! Range selector for dispatch batches
//!
//! A batch is addressed by a list of specifiers:
//!
//! | Specifier | Selects |
//! |-----------|---------|
//! | `8000-9000` | numeric ids in the inclusive range |
//! | `>9000` | numeric ids strictly greater |
//! | `<500` | numeric ids strictly less |
//! | anything else | that literal id |

use crate::state::AmvState;
use crate::storage::{AmvRecord, EntryStore};
use crate::AmvError;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static RANGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-(\d+)$").expect("range regex is valid"));

static GREATER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>(\d+)$").expect("greater-than regex is valid"));

static LESS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(\d+)$").expect("less-than regex is valid"));

/// One parsed specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSpec {
    /// Inclusive numeric range
    Range(u64, u64),
    /// Numeric id strictly greater than the threshold
    GreaterThan(u64),
    /// Numeric id strictly less than the threshold
    LessThan(u64),
    /// A single id, taken as written
    Exact(String),
}

impl RangeSpec {
    /// Parses a specifier
    ///
    /// Surrounding whitespace is ignored. Forms are tried in the order range,
    /// greater-than, less-than; anything else (including numbers too large
    /// for a u64) is a literal id. Only a blank specifier is an error.
    ///
    /// # Example
    ///
    /// ```
    /// use amv_harvest::selector::RangeSpec;
    ///
    /// assert_eq!(RangeSpec::parse("8000-9000").unwrap(), RangeSpec::Range(8000, 9000));
    /// assert_eq!(RangeSpec::parse(">9000").unwrap(), RangeSpec::GreaterThan(9000));
    /// assert_eq!(RangeSpec::parse("-5-10").unwrap(), RangeSpec::Exact("-5-10".into()));
    /// ```
    pub fn parse(input: &str) -> Result<Self, AmvError> {
        let spec = input.trim();
        if spec.is_empty() {
            return Err(AmvError::InvalidSpecifier(input.to_string()));
        }

        if let Some(caps) = RANGE_PATTERN.captures(spec) {
            if let (Ok(start), Ok(end)) = (caps[1].parse(), caps[2].parse()) {
                return Ok(Self::Range(start, end));
            }
        }

        if let Some(caps) = GREATER_PATTERN.captures(spec) {
            if let Ok(threshold) = caps[1].parse() {
                return Ok(Self::GreaterThan(threshold));
            }
        }

        if let Some(caps) = LESS_PATTERN.captures(spec) {
            if let Ok(threshold) = caps[1].parse() {
                return Ok(Self::LessThan(threshold));
            }
        }

        Ok(Self::Exact(spec.to_string()))
    }

    /// Whether a numeric id falls under this specifier
    ///
    /// Always false for `Exact`, which matches by text instead.
    pub fn matches_numeric(&self, value: u64) -> bool {
        match self {
            Self::Range(start, end) => (*start..=*end).contains(&value),
            Self::GreaterThan(threshold) => value > *threshold,
            Self::LessThan(threshold) => value < *threshold,
            Self::Exact(_) => false,
        }
    }

    /// Ids this specifier selects out of `records`
    ///
    /// Numeric forms return matching ids in ascending numeric order. `Exact`
    /// returns its literal whether or not it is among the records.
    pub fn resolve(&self, records: &[AmvRecord]) -> Vec<String> {
        if let Self::Exact(id) = self {
            return vec![id.clone()];
        }

        let mut matched: Vec<(u64, &str)> = records
            .iter()
            .filter_map(|r| r.numeric_id().map(|n| (n, r.id.as_str())))
            .filter(|(n, _)| self.matches_numeric(*n))
            .collect();
        matched.sort();
        matched.into_iter().map(|(_, id)| id.to_string()).collect()
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(start, end) => write!(f, "{}-{}", start, end),
            Self::GreaterThan(threshold) => write!(f, ">{}", threshold),
            Self::LessThan(threshold) => write!(f, "<{}", threshold),
            Self::Exact(id) => write!(f, "{}", id),
        }
    }
}

/// Parses a list of specifiers, failing on the first blank one
pub fn parse_specs<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<RangeSpec>, AmvError> {
    inputs.iter().map(|s| RangeSpec::parse(s.as_ref())).collect()
}

/// Resolves specifiers against the records in `state`
///
/// The result is the union of every specifier's ids, de-duplicated with the
/// first occurrence kept.
pub fn select_ids(
    store: &dyn EntryStore,
    specs: &[RangeSpec],
    state: AmvState,
) -> Result<Vec<String>, AmvError> {
    let records = store.list(Some(state))?;

    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for spec in specs {
        let resolved = spec.resolve(&records);
        tracing::debug!("Specifier {} selects {} ids", spec, resolved.len());
        for id in resolved {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }

    Ok(ids)
}
