//! Acquisition orchestrator
//!
//! Drives an AMV from DISCOVERED to READY: resolve the article page to its
//! best torrent, store the file, then record the reference and the new state
//! in one store transaction.

use crate::config::Config;
use crate::resolver::{select_best, DownloadResolver};
use crate::state::AmvState;
use crate::storage::EntryStore;
use crate::AmvError;
use std::time::Duration;

/// Outcome of a batch acquisition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquireSummary {
    /// Pending AMVs attempted
    pub attempted: usize,
    /// AMVs that reached READY
    pub succeeded: usize,
    /// AMVs left untouched
    pub failed: usize,
}

/// Acquires torrents for discovered AMVs
pub struct Acquirer {
    resolver: DownloadResolver,
    request_delay: Duration,
}

impl Acquirer {
    /// Creates an acquirer with its own resolver
    pub fn new(config: &Config) -> Result<Self, AmvError> {
        Ok(Self::with_resolver(
            DownloadResolver::new(config)?,
            config.http.request_delay(),
        ))
    }

    /// Creates an acquirer around an existing resolver
    pub fn with_resolver(resolver: DownloadResolver, request_delay: Duration) -> Self {
        Self {
            resolver,
            request_delay,
        }
    }

    /// Acquires the torrent for one AMV
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - the torrent is stored and the AMV is READY
    /// * `Ok(false)` - unknown id, AMV past DISCOVERED, no candidates, or a
    ///   failed download; the record is unchanged
    /// * `Err(_)` - the store itself failed
    pub async fn acquire(&self, store: &mut dyn EntryStore, id: &str) -> Result<bool, AmvError> {
        let Some(record) = store.get(id)? else {
            tracing::warn!("AMV {} is not in the database", id);
            return Ok(false);
        };

        if record.state != AmvState::Discovered {
            tracing::warn!("AMV {} is already {}, not downloading again", id, record.state);
            return Ok(false);
        }

        let candidates = self.resolver.extract_candidates(&record.article_url).await;
        let Some(best) = select_best(&candidates) else {
            tracing::warn!("No torrent candidates for {} ({})", id, record.article_url);
            return Ok(false);
        };

        tracing::debug!(
            "Chose {} ({:.2} MB) out of {} candidates for {}",
            best.torrent_url,
            best.size_mb,
            candidates.len(),
            id
        );

        let reference = match self.resolver.fetch_and_store(&best.torrent_url, id).await {
            Ok(reference) => reference,
            Err(e) => {
                tracing::warn!("Could not store torrent for {}: {}", id, e);
                return Ok(false);
            }
        };

        store.mark_ready(id, &reference)?;
        tracing::info!("AMV {} ready: {}", id, reference);
        Ok(true)
    }

    /// Acquires every DISCOVERED AMV in turn
    ///
    /// Failures are counted and skipped; only a store failure aborts.
    pub async fn acquire_all_pending(
        &self,
        store: &mut dyn EntryStore,
    ) -> Result<AcquireSummary, AmvError> {
        let pending = store.list(Some(AmvState::Discovered))?;
        tracing::info!("{} AMVs pending acquisition", pending.len());

        let mut summary = AcquireSummary::default();

        for (index, record) in pending.iter().enumerate() {
            if index > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            summary.attempted += 1;
            if self.acquire(store, &record.id).await? {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }

        tracing::info!(
            "Acquisition finished: {} of {} succeeded",
            summary.succeeded,
            summary.attempted
        );

        Ok(summary)
    }
}
