//! # Cache Populator
//!
//! Proactively fetches the files of a setlist's content items into the
//! [`FileCacheStore`] ahead of need, so navigation during the show never
//! waits on the network.
//!
//! Fetches run concurrently (bounded by a semaphore) and are individually
//! fault-isolated: one item's failure never cancels or delays the others. A
//! persistent failure is recorded in the failure ledger, not thrown, and
//! surfaces as an absent cache entry; the resolver then falls back to the
//! item's remote reference.

use crate::config::PerformanceConfig;
use crate::error::{PerformanceError, Result};
use crate::lifecycle::ResourceLifecycleManager;
use crate::store::FileCacheStore;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::storage::FileSystemAccess;
use core_content::{ContentId, ContentItem};
use core_runtime::events::{CacheEvent, CoreEvent, EventBus};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

/// Whether a warm pass refetches items that are already cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmMode {
    /// Leave existing entries untouched (idempotent warm).
    SkipCached,
    /// Refetch every item, replacing existing entries.
    ForceRefresh,
}

/// Per-item result of a warm pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmOutcome {
    /// The item's file was fetched and installed (bytes written).
    Cached(u64),
    /// Nothing to do: text-based, already cached, or fetch already in flight.
    Skipped,
    /// The fetch failed persistently; recorded in the failure ledger.
    Failed,
}

/// Summary of one warm pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmSummary {
    pub cached: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Fetches content files into the cache store.
pub struct CachePopulator {
    config: PerformanceConfig,
    store: Arc<FileCacheStore>,
    lifecycle: Arc<ResourceLifecycleManager>,
    http: Arc<dyn HttpClient>,
    fs: Arc<dyn FileSystemAccess>,
    event_bus: Option<Arc<EventBus>>,
    fetch_semaphore: Arc<Semaphore>,
    in_flight: Mutex<HashSet<ContentId>>,
    failures: Mutex<HashMap<ContentId, String>>,
}

impl CachePopulator {
    pub fn new(
        config: PerformanceConfig,
        store: Arc<FileCacheStore>,
        lifecycle: Arc<ResourceLifecycleManager>,
        http: Arc<dyn HttpClient>,
        fs: Arc<dyn FileSystemAccess>,
    ) -> Self {
        let fetch_semaphore = Arc::new(Semaphore::new(config.max_concurrent_fetches));

        Self {
            config,
            store,
            lifecycle,
            http,
            fs,
            event_bus: None,
            fetch_semaphore,
            in_flight: Mutex::new(HashSet::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Set event bus for cache population events.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Warm the cache for a set of content items.
    ///
    /// Entries appear in the store asynchronously and out of order relative
    /// to the input list; callers must not assume completion ordering. Never
    /// returns an error: per-item failures are recorded and summarized.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn warm(&self, items: &[ContentItem], mode: WarmMode) -> WarmSummary {
        if !self.http.is_connected().await {
            warn!("Network unreachable at warm start; relying on existing cache entries");
        }

        let media_items: Vec<&ContentItem> =
            items.iter().filter(|item| item.is_media_file()).collect();

        self.emit(CacheEvent::WarmStarted {
            total: media_items.len(),
        });

        let outcomes = futures::future::join_all(
            media_items.iter().map(|item| self.warm_item(item, mode)),
        )
        .await;

        let mut summary = WarmSummary::default();
        for outcome in outcomes {
            match outcome {
                WarmOutcome::Cached(_) => summary.cached += 1,
                WarmOutcome::Skipped => summary.skipped += 1,
                WarmOutcome::Failed => summary.failed += 1,
            }
        }

        info!(
            cached = summary.cached,
            skipped = summary.skipped,
            failed = summary.failed,
            "Warm pass complete"
        );

        self.emit(CacheEvent::WarmCompleted {
            cached: summary.cached,
            failed: summary.failed,
        });

        summary
    }

    /// Warm a single item. Fault-isolated: never returns an error.
    pub async fn warm_item(&self, item: &ContentItem, mode: WarmMode) -> WarmOutcome {
        if item.is_chart() {
            // Text payload is already in memory as part of the item.
            return WarmOutcome::Skipped;
        }

        if mode == WarmMode::SkipCached && self.store.contains(&item.id) {
            debug!(content_id = %item.id, "Already cached, skipping");
            return WarmOutcome::Skipped;
        }

        // Single-flight per id: a concurrent warm of the same item is dropped
        // rather than queued, which keeps `put` last-write-wins per id.
        if !self.in_flight.lock().insert(item.id) {
            debug!(content_id = %item.id, "Fetch already in flight, skipping");
            return WarmOutcome::Skipped;
        }

        let result = self.fetch_with_retry(item).await;
        self.in_flight.lock().remove(&item.id);

        match result {
            Ok(bytes) => {
                self.failures.lock().remove(&item.id);
                debug!(content_id = %item.id, bytes, "Item cached");
                self.emit(CacheEvent::ItemCached {
                    content_id: item.id.to_string(),
                    bytes,
                });
                WarmOutcome::Cached(bytes)
            }
            Err(e) => {
                warn!(content_id = %item.id, title = %item.title, error = %e, "Item fetch failed");
                self.failures.lock().insert(item.id, e.to_string());
                self.emit(CacheEvent::ItemFailed {
                    content_id: item.id.to_string(),
                    reason: e.to_string(),
                });
                WarmOutcome::Failed
            }
        }
    }

    /// Fetch with bounded timeout per attempt and a retry with backoff on
    /// transient failure.
    async fn fetch_with_retry(&self, item: &ContentItem) -> Result<u64> {
        let _permit = self
            .fetch_semaphore
            .acquire()
            .await
            .map_err(|_| PerformanceError::Internal("fetch semaphore closed".to_string()))?;

        let mut last_error = None;

        for attempt in 1..=self.config.max_fetch_attempts {
            debug!(
                content_id = %item.id,
                attempt,
                max_attempts = self.config.max_fetch_attempts,
                "Fetch attempt"
            );

            match timeout(self.config.fetch_timeout, self.fetch_and_install(item)).await {
                Ok(Ok(bytes)) => return Ok(bytes),
                Ok(Err(e)) => {
                    warn!(content_id = %item.id, attempt, error = %e, "Fetch attempt failed");
                    let transient = e.is_transient();
                    last_error = Some(e);
                    if !transient {
                        break;
                    }
                }
                Err(_) => {
                    warn!(content_id = %item.id, attempt, "Fetch attempt timed out");
                    last_error = Some(PerformanceError::FetchTimeout {
                        id: item.id.to_string(),
                    });
                }
            }

            if attempt < self.config.max_fetch_attempts {
                let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
                sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PerformanceError::Internal("fetch failed with no recorded error".to_string())
        }))
    }

    /// One fetch attempt: download, materialize, install.
    ///
    /// The store entry is only installed after the file is fully written, so
    /// a partially fetched item is indistinguishable from an absent one.
    async fn fetch_and_install(&self, item: &ContentItem) -> Result<u64> {
        let remote = item
            .remote
            .as_ref()
            .ok_or_else(|| PerformanceError::NoFileReference(item.id.to_string()))?;

        let response = self.http.execute(HttpRequest::get(remote.url.as_str())).await?;

        if response.is_client_error() {
            return Err(PerformanceError::RemoteRejected {
                id: item.id.to_string(),
                status: response.status,
            });
        }
        if !response.is_success() {
            return Err(PerformanceError::FetchFailed {
                id: item.id.to_string(),
                reason: format!("HTTP {}", response.status),
            });
        }

        // Server-declared media type wins over the repository hint.
        let media_type = response
            .content_type()
            .unwrap_or_else(|| remote.media_type());

        let dir = self.cache_dir().await?;
        let path = dir.join(format!("{}.bin", item.id));
        let bytes = response.body.len() as u64;

        self.fs.write_file(&path, response.body).await?;

        let handle = self.lifecycle.track(path, bytes);
        self.store.put(item.id, handle, media_type).await;

        Ok(bytes)
    }

    async fn cache_dir(&self) -> Result<PathBuf> {
        let base = self.fs.get_cache_directory().await?;
        let dir = base.join(&self.config.cache_directory);
        self.fs.create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// The recorded failure reason for an item, if its last fetch failed.
    pub fn failure_for(&self, id: &ContentId) -> Option<String> {
        self.failures.lock().get(id).cloned()
    }

    /// Number of items whose last fetch failed.
    pub fn failure_count(&self) -> usize {
        self.failures.lock().len()
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Cache(event)).ok();
        }
    }
}
