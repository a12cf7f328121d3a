use crate::config::types::{ClientConfig, Config, HttpConfig, LibraryConfig, SiteConfig, StorageConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_http_config(&config.http)?;
    validate_storage_config(&config.storage)?;
    validate_client_config(&config.client)?;
    validate_library_config(&config.library)?;
    Ok(())
}

/// Validates the source site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    Url::parse(&config.listing_url())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid listing-path: {}", e)))?;

    if config.article_link_class.trim().is_empty() {
        return Err(ConfigError::Validation(
            "article-link-class cannot be empty".to_string(),
        ));
    }

    if config.size_class.trim().is_empty() {
        return Err(ConfigError::Validation(
            "size-class cannot be empty".to_string(),
        ));
    }

    Regex::new(&config.download_pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!(
            "download-pattern '{}' is not a valid regex: {}",
            config.download_pattern, e
        ))
    })?;

    Ok(())
}

/// Validates HTTP settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates storage locations
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.torrent_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "torrent-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates torrent client settings
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.torrent_client.trim().is_empty() {
        return Err(ConfigError::Validation(
            "torrent-client cannot be empty".to_string(),
        ));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be >= 1, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Validates library scan settings
fn validate_library_config(config: &LibraryConfig) -> Result<(), ConfigError> {
    if config.id_width < 1 || config.id_width > 12 {
        return Err(ConfigError::Validation(format!(
            "id-width must be between 1 and 12, got {}",
            config.id_width
        )));
    }

    Ok(())
}
