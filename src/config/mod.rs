//! Configuration module for AMV Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use amv_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("amv-harvest.toml")).unwrap();
//! println!("Listing starts at: {}", config.site.listing_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ClientConfig, Config, HttpConfig, LibraryConfig, SiteConfig, StorageConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
