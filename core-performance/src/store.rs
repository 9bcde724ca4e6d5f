//! # File Cache Store
//!
//! In-memory index from content id to materialized file handle. Lookups are
//! synchronous and constant time, which is what lets the navigator show a
//! cached file without ever waiting on I/O; the bytes themselves live on disk
//! under the app cache directory.
//!
//! Invariant: at most one entry per content id, and every stored handle is
//! live. Mutation goes through `put`/`remove`/`clear` only; displaced handles
//! are released through the [`ResourceLifecycleManager`] after the
//! replacement is installed, so readers never observe a gap.

use crate::lifecycle::{LocalHandle, ResourceLifecycleManager};
use core_content::ContentId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A cached, locally materialized content file.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Handle to the materialized file.
    pub handle: LocalHandle,
    /// Media type the file should be rendered as.
    pub media_type: String,
    /// When the entry was installed (Unix epoch seconds).
    pub cached_at: i64,
}

/// Key/value store mapping content ids to cache entries.
pub struct FileCacheStore {
    entries: RwLock<HashMap<ContentId, CacheEntry>>,
    lifecycle: Arc<ResourceLifecycleManager>,
}

impl FileCacheStore {
    pub fn new(lifecycle: Arc<ResourceLifecycleManager>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            lifecycle,
        }
    }

    /// Look up the entry for a content id.
    ///
    /// Pure lookup: no I/O, completes synchronously.
    pub fn get(&self, id: &ContentId) -> Option<CacheEntry> {
        self.entries.read().get(id).cloned()
    }

    /// Returns `true` if an entry exists for the content id.
    pub fn contains(&self, id: &ContentId) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Returns `true` if the given handle backs any current entry.
    pub fn owns_handle(&self, handle: &LocalHandle) -> bool {
        self.entries
            .read()
            .values()
            .any(|entry| entry.handle.id() == handle.id())
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Total bytes across all cached files.
    pub fn cached_bytes(&self) -> u64 {
        self.entries
            .read()
            .values()
            .map(|entry| entry.handle.len())
            .sum()
    }

    /// Insert or replace the entry for a content id.
    ///
    /// The new entry is installed before any displaced handle is released,
    /// so a concurrent reader sees either the old file or the new one.
    pub async fn put(&self, id: ContentId, handle: LocalHandle, media_type: impl Into<String>) {
        let entry = CacheEntry {
            handle,
            media_type: media_type.into(),
            cached_at: chrono::Utc::now().timestamp(),
        };

        let displaced = self.entries.write().insert(id, entry);

        if let Some(old) = displaced {
            debug!(content_id = %id, "Replaced cache entry, releasing displaced handle");
            self.lifecycle.supersede(&old.handle).await;
        } else {
            debug!(content_id = %id, "Installed cache entry");
        }
    }

    /// Remove the entry for a content id and release its handle immediately.
    pub async fn remove(&self, id: &ContentId) {
        let removed = self.entries.write().remove(id);

        if let Some(entry) = removed {
            self.lifecycle.release(&entry.handle).await;
            debug!(content_id = %id, "Removed cache entry");
        }
    }

    /// Release all handles and empty the store.
    ///
    /// Used on the explicit "clear cache" user action and on storage-quota
    /// pressure.
    pub async fn clear(&self) {
        let drained: Vec<CacheEntry> = {
            let mut entries = self.entries.write();
            entries.drain().map(|(_, entry)| entry).collect()
        };

        let count = drained.len();
        for entry in drained {
            self.lifecycle.release(&entry.handle).await;
        }

        info!(entries = count, "Cleared cache store");
    }
}

impl fmt::Debug for FileCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCacheStore")
            .field("entries", &self.len())
            .field("bytes", &self.cached_bytes())
            .finish()
    }
}
