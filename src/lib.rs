//! AMV Harvest: tracks AMVs published on a news site
//!
//! This crate discovers AMV articles by crawling a paginated news listing,
//! acquires the best torrent file for each article, and hands ready torrents
//! to an external client. Every AMV moves through a four-stage lifecycle kept
//! in a SQLite database.

pub mod acquisition;
pub mod config;
pub mod crawler;
pub mod dispatch;
pub mod library;
pub mod links;
pub mod output;
pub mod resolver;
pub mod selector;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for AMV Harvest operations
#[derive(Debug, Error)]
pub enum AmvError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid specifier: {0}")]
    InvalidSpecifier(String),

    #[error("External process {program} failed: {message}")]
    ExternalProcess { program: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern in config: {0}")]
    InvalidPattern(String),
}

/// Result type alias for AMV Harvest operations
pub type Result<T> = std::result::Result<T, AmvError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::AmvState;
pub use storage::{AmvRecord, EntryStore, SqliteStorage};
