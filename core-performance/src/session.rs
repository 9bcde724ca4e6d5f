//! # Performance Session
//!
//! Facade wiring the cache store, populator, resolver, navigator, and
//! lifecycle manager into the surface the UI layer consumes for one
//! performance: `warm_setlist` → navigation queries → `teardown`.
//!
//! The session is `Send + Sync` and cheap to share behind an `Arc`: the UI
//! event loop drives navigation while the warm task fills the cache
//! concurrently.

use crate::config::PerformanceConfig;
use crate::error::{PerformanceError, Result};
use crate::lifecycle::{LocalHandle, ResourceLifecycleManager};
use crate::navigator::{ItemDisplay, NavigationRequest, PlaybackNavigator, PlaybackPosition};
use crate::populator::{CachePopulator, WarmMode};
use crate::stats::CacheStats;
use crate::store::FileCacheStore;
use bridge_traits::http::HttpClient;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_content::ContentItem;
use core_runtime::events::{CacheEvent, CoreEvent, EventBus, PlaybackEvent};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One performance-mode session: owned cache state with a defined lifecycle.
pub struct PerformanceSession {
    config: PerformanceConfig,
    http: Arc<dyn HttpClient>,
    fs: Arc<dyn FileSystemAccess>,
    lifecycle: Arc<ResourceLifecycleManager>,
    store: Arc<FileCacheStore>,
    populator: Arc<CachePopulator>,
    navigator: PlaybackNavigator,
    event_bus: Option<Arc<EventBus>>,
}

impl PerformanceSession {
    /// Create a new session over the given platform bridges.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: PerformanceConfig,
        http: Arc<dyn HttpClient>,
        fs: Arc<dyn FileSystemAccess>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PerformanceError::Internal(format!("Invalid configuration: {}", e)))?;

        let lifecycle = Arc::new(ResourceLifecycleManager::new(fs.clone()));
        let store = Arc::new(FileCacheStore::new(lifecycle.clone()));
        let populator = Arc::new(CachePopulator::new(
            config.clone(),
            store.clone(),
            lifecycle.clone(),
            http.clone(),
            fs.clone(),
        ));
        let navigator = PlaybackNavigator::new(store.clone(), lifecycle.clone());

        Ok(Self {
            config,
            http,
            fs,
            lifecycle,
            store,
            populator,
            navigator,
            event_bus: None,
        })
    }

    /// Set event bus for session and cache events.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.populator = Arc::new(
            CachePopulator::new(
                self.config.clone(),
                self.store.clone(),
                self.lifecycle.clone(),
                self.http.clone(),
                self.fs.clone(),
            )
            .with_event_bus(event_bus.clone()),
        );
        self.event_bus = Some(event_bus);
        self
    }

    /// Prepare the on-disk cache directory, sweeping leftovers from a
    /// previous session that did not tear down cleanly.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        let base = self.fs.get_cache_directory().await?;
        let dir = base.join(&self.config.cache_directory);

        if self.fs.exists(&dir).await? {
            let mut swept = 0usize;
            for entry in self.fs.list_directory(&dir).await? {
                match self.fs.metadata(&entry).await {
                    Ok(meta) if meta.is_directory => continue,
                    _ => {}
                }
                if let Err(e) = self.fs.delete_file(&entry).await {
                    warn!(path = ?entry, error = %e, "Failed to sweep stale cache file");
                } else {
                    swept += 1;
                }
            }
            if swept > 0 {
                info!(swept, "Swept stale cache files from previous session");
            }
        } else {
            self.fs.create_dir_all(&dir).await?;
        }

        info!(path = ?dir, "Performance session initialized");
        Ok(())
    }

    /// Fire-and-forget cache population for a setlist.
    ///
    /// Spawns the warm pass on the ambient tokio runtime and returns
    /// immediately; entries appear in the cache asynchronously. Called once
    /// when entering performance mode.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn warm_setlist(&self, items: Vec<ContentItem>) {
        let populator = self.populator.clone();
        tokio::spawn(async move {
            populator.warm(&items, WarmMode::SkipCached).await;
        });
    }

    /// Hand the setlist to the navigator, positioned at its first item.
    pub async fn load_setlist(&self, items: Vec<ContentItem>) -> PlaybackPosition {
        let position = self.navigator.load_setlist(items).await;
        self.emit_position(position);
        position
    }

    /// Drive the navigator. Infallible: resolution failure surfaces as a
    /// [`ItemDisplay::Failed`] display state, never as an error, and the
    /// musician can always keep navigating.
    pub async fn navigate(&self, request: NavigationRequest) -> PlaybackPosition {
        let position = self.navigator.navigate(request).await;
        self.emit_position(position);

        if let ItemDisplay::Failed(reason) = self.navigator.resolve_current() {
            self.emit(CoreEvent::Playback(PlaybackEvent::ItemUnavailable {
                index: position.index,
                reason,
            }));
        }

        position
    }

    /// Read the current navigator state's resolved reference for rendering.
    pub fn resolve_current(&self) -> ItemDisplay {
        self.navigator.resolve_current()
    }

    /// Current playback position.
    pub fn position(&self) -> PlaybackPosition {
        self.navigator.position()
    }

    /// Re-resolve the current item, e.g. after a warm pass completed while
    /// the item was showing its remote fallback.
    pub async fn refresh_current(&self) -> bool {
        self.navigator.refresh().await
    }

    /// Read the bytes behind a cached handle.
    ///
    /// # Errors
    ///
    /// Returns [`PerformanceError::HandleNotLive`] if the handle was revoked
    /// (e.g. the cache was cleared while the item was displayed).
    pub async fn read_cached(&self, handle: &LocalHandle) -> Result<Bytes> {
        if !self.lifecycle.is_live(handle) {
            return Err(PerformanceError::HandleNotLive(handle.id().to_string()));
        }

        Ok(self.fs.read_file(handle.path()).await?)
    }

    /// Snapshot of cache occupancy and failures.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            items_cached: self.store.len(),
            items_failed: self.populator.failure_count(),
            total_bytes: self.store.cached_bytes(),
            calculated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Release all cached handles and empty the store.
    ///
    /// The currently displayed item keeps its display state; its handle is
    /// revoked, and the next navigation to it re-resolves (falling back to
    /// remote or unavailable).
    pub async fn clear_cache(&self) {
        self.store.clear().await;
        self.emit(CoreEvent::Cache(CacheEvent::CacheCleared));
    }

    /// End the session: release every tracked handle. Idempotent.
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        self.navigator.reset().await;
        self.store.clear().await;
        self.lifecycle.release_all().await;

        self.emit(CoreEvent::Playback(PlaybackEvent::SessionEnded));
        info!(
            tracked = self.lifecycle.tracked_count(),
            released = self.lifecycle.released_count(),
            "Performance session torn down"
        );
    }

    /// The populator, for hosts that drive warming directly (e.g. a
    /// force-refresh of a single edited item).
    pub fn populator(&self) -> &Arc<CachePopulator> {
        &self.populator
    }

    /// The lifecycle manager, for diagnostics (handle accounting).
    pub fn lifecycle(&self) -> &Arc<ResourceLifecycleManager> {
        &self.lifecycle
    }

    fn emit_position(&self, position: PlaybackPosition) {
        self.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
            index: position.index,
            page: position.page,
            generation: position.generation,
        }));
    }

    fn emit(&self, event: CoreEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event).ok();
        }
    }
}
