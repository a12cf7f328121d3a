//! Dispatch of ready torrents to an external torrent client
//!
//! Selected READY AMVs are resolved to their torrent files and handed to the
//! client in chunks. Each chunk that the client accepts is marked DISPATCHED
//! before the next one is sent.

use crate::config::ClientConfig;
use crate::state::AmvState;
use crate::storage::EntryStore;
use crate::AmvError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Receiver of torrent files
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Hands a batch of absolute torrent paths to the client
    async fn add(&self, files: &[PathBuf]) -> Result<(), AmvError>;

    /// Name used in log output
    fn name(&self) -> &str;
}

/// Torrent client run as an external executable
///
/// The executable is looked up in PATH on every call and receives the
/// torrent paths as its arguments.
#[derive(Debug, Clone)]
pub struct CommandTorrentClient {
    program: String,
}

impl CommandTorrentClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.torrent_client.clone())
    }

    fn process_error(&self, message: impl Into<String>) -> AmvError {
        AmvError::ExternalProcess {
            program: self.program.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl TorrentClient for CommandTorrentClient {
    async fn add(&self, files: &[PathBuf]) -> Result<(), AmvError> {
        let binary = which::which(&self.program)
            .map_err(|e| self.process_error(format!("not found in PATH: {}", e)))?;

        let status = Command::new(&binary)
            .args(files)
            .status()
            .await
            .map_err(|e| self.process_error(format!("failed to execute: {}", e)))?;

        if !status.success() {
            return Err(self.process_error(format!("exited with {}", status)));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Outcome of a dispatch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Ids requested
    pub requested: usize,
    /// Ids skipped (unknown, not READY, or torrent file missing)
    pub skipped: usize,
    /// Ids handed to the client and marked DISPATCHED
    pub dispatched: usize,
    /// Client invocations that succeeded
    pub batches: usize,
}

/// Resolves an id to the absolute path of its READY torrent
fn ready_torrent_path(
    store: &dyn EntryStore,
    torrent_dir: &Path,
    id: &str,
) -> Result<Option<PathBuf>, AmvError> {
    let Some(record) = store.get(id)? else {
        tracing::warn!("AMV {} is not in the database, skipping", id);
        return Ok(None);
    };

    if record.state != AmvState::Ready {
        tracing::warn!("AMV {} is {}, not ready, skipping", id, record.state);
        return Ok(None);
    }

    let Some(reference) = record.file_reference else {
        tracing::warn!("AMV {} has no torrent file recorded, skipping", id);
        return Ok(None);
    };

    let path = std::path::absolute(torrent_dir.join(&reference))?;
    if !path.is_file() {
        tracing::warn!("Torrent for {} is missing at {}, skipping", id, path.display());
        return Ok(None);
    }

    Ok(Some(path))
}

/// Sends the torrents of `ids` to `client` in chunks of `batch_size`
///
/// A client failure stops the run and is returned; chunks sent before it
/// stay DISPATCHED.
pub async fn dispatch(
    store: &mut dyn EntryStore,
    client: &dyn TorrentClient,
    torrent_dir: &Path,
    ids: &[String],
    batch_size: usize,
) -> Result<DispatchSummary, AmvError> {
    let mut summary = DispatchSummary {
        requested: ids.len(),
        ..Default::default()
    };

    let mut ready: Vec<(String, PathBuf)> = Vec::new();
    for id in ids {
        match ready_torrent_path(store, torrent_dir, id)? {
            Some(path) => ready.push((id.clone(), path)),
            None => summary.skipped += 1,
        }
    }

    if ready.is_empty() {
        tracing::info!("Nothing to dispatch");
        return Ok(summary);
    }

    for chunk in ready.chunks(batch_size.max(1)) {
        let files: Vec<PathBuf> = chunk.iter().map(|(_, path)| path.clone()).collect();

        tracing::info!("Sending {} torrents to {}", files.len(), client.name());
        client.add(&files).await?;

        for (id, _) in chunk {
            store.set_state(id, AmvState::Dispatched)?;
        }

        summary.batches += 1;
        summary.dispatched += chunk.len();
    }

    tracing::info!(
        "Dispatched {} of {} requested AMVs in {} batches",
        summary.dispatched,
        summary.requested,
        summary.batches
    );

    Ok(summary)
}
