//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests for listing and article pages
//! - Binary downloads for torrent files
//! - Error classification
//!
//! There is no retry logic. Callers treat a failed fetch as "no data".

use crate::config::HttpConfig;
use crate::AmvError;
use reqwest::Client;
use std::time::Duration;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns the body on success, logging the failure otherwise
    pub fn into_body(self, url: &str) -> Option<String> {
        match self {
            Self::Success { body } => Some(body),
            Self::HttpError { status_code } => {
                tracing::warn!("HTTP {} fetching {}", status_code, url);
                None
            }
            Self::NetworkError { error } => {
                tracing::warn!("Network error fetching {}: {}", url, error);
                None
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use amv_harvest::config::HttpConfig;
/// use amv_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10).min(config.timeout()))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page as text
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | Other HTTP status | HttpError |
/// | Timeout / connect / body error | NetworkError |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success { body },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => FetchResult::NetworkError {
            error: classify_error(&e),
        },
    }
}

/// Downloads a binary resource
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, AmvError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| AmvError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AmvError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|source| AmvError::Http {
        url: url.to_string(),
        source,
    })?;

    Ok(bytes.to_vec())
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
