//! Lifecycle state definitions for tracked AMVs
//!
//! An AMV only moves forward through these states. The numeric values are
//! what the database stores.

use std::fmt;

/// Represents where an AMV is in the acquisition lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AmvState {
    /// Found on a listing page, no torrent yet
    Discovered,

    /// Torrent file downloaded and stored locally
    Ready,

    /// Torrent handed to the external client
    Dispatched,

    /// Video present in the local collection
    Collected,
}

impl AmvState {
    /// Converts the state to its database integer
    pub fn to_db_int(&self) -> i64 {
        match self {
            Self::Discovered => 0,
            Self::Ready => 1,
            Self::Dispatched => 2,
            Self::Collected => 3,
        }
    }

    /// Parses a state from its database integer
    ///
    /// Returns None if the value doesn't match any known state.
    pub fn from_db_int(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Discovered),
            1 => Some(Self::Ready),
            2 => Some(Self::Dispatched),
            3 => Some(Self::Collected),
            _ => None,
        }
    }

    /// Human readable label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            Self::Discovered => "not collected",
            Self::Ready => "torrent ready",
            Self::Dispatched => "sent to client",
            Self::Collected => "in collection",
        }
    }

    /// Returns true if the pipeline may move an AMV from `self` to `next`
    ///
    /// The regular transitions advance one step at a time. The library scan
    /// may jump to Collected from anywhere.
    pub fn can_transition_to(&self, next: AmvState) -> bool {
        match (self, next) {
            (_, Self::Collected) => true,
            (Self::Discovered, Self::Ready) => true,
            (Self::Ready, Self::Dispatched) => true,
            _ => false,
        }
    }

    /// Returns all states in lifecycle order
    pub fn all_states() -> [Self; 4] {
        [
            Self::Discovered,
            Self::Ready,
            Self::Dispatched,
            Self::Collected,
        ]
    }
}

impl fmt::Display for AmvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
