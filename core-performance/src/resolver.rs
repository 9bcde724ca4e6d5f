//! # Cache Resolution
//!
//! Decides which source to render for a content item: the cached local file,
//! the declared remote reference, or nothing. Resolution is synchronous with
//! respect to the cache and never performs a network call; "resolve, then
//! maybe upgrade on the next navigation" is the model.

use crate::lifecycle::LocalHandle;
use crate::store::FileCacheStore;
use core_content::ContentItem;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// The source chosen for rendering a content item.
///
/// Transient: recomputed on every navigation, never stored beyond the
/// currently displayed item.
#[derive(Debug, Clone)]
pub enum ResolvedReference {
    /// Text-based material carried in memory; handed through unchanged.
    Chart {
        /// The inline text payload.
        body: String,
    },

    /// A cached, locally materialized file.
    Cached {
        /// Handle to the local file.
        handle: LocalHandle,
        /// Media type to render the file as.
        media_type: String,
    },

    /// Fallback to the declared remote reference.
    Remote {
        /// Full URL of the file in the remote content store.
        url: String,
        /// Declared media type.
        media_type: String,
    },

    /// No cached entry and no remote reference.
    Unavailable {
        /// Why nothing could be resolved.
        reason: String,
    },
}

impl ResolvedReference {
    /// Returns `true` if the reference points at the local cache.
    pub fn is_cached(&self) -> bool {
        matches!(self, ResolvedReference::Cached { .. })
    }

    /// Returns `true` if the reference requires network access to render.
    pub fn is_remote(&self) -> bool {
        matches!(self, ResolvedReference::Remote { .. })
    }

    /// Returns `true` if there is anything to render at all.
    pub fn is_available(&self) -> bool {
        !matches!(self, ResolvedReference::Unavailable { .. })
    }
}

impl fmt::Display for ResolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedReference::Chart { .. } => write!(f, "chart"),
            ResolvedReference::Cached { handle, .. } => write!(f, "cached({})", handle.id()),
            ResolvedReference::Remote { url, .. } => write!(f, "remote({})", url),
            ResolvedReference::Unavailable { reason } => write!(f, "unavailable({})", reason),
        }
    }
}

/// Cache-first resolution over the file cache store.
pub struct CacheResolver {
    store: Arc<FileCacheStore>,
}

impl CacheResolver {
    pub fn new(store: Arc<FileCacheStore>) -> Self {
        Self { store }
    }

    /// Resolve the best available reference for an item.
    ///
    /// Never blocks or awaits. If the populator fills the cache for an item
    /// already rendered via `Remote`, the upgrade is picked up the next time
    /// the item is resolved, not retroactively.
    pub fn resolve(&self, item: &ContentItem) -> ResolvedReference {
        if item.is_chart() {
            return match &item.body {
                Some(body) => ResolvedReference::Chart { body: body.clone() },
                None => ResolvedReference::Unavailable {
                    reason: "chart has no text payload".to_string(),
                },
            };
        }

        if let Some(entry) = self.store.get(&item.id) {
            trace!(content_id = %item.id, "Resolved from cache");
            return ResolvedReference::Cached {
                handle: entry.handle,
                media_type: entry.media_type,
            };
        }

        if let Some(remote) = &item.remote {
            trace!(content_id = %item.id, "Resolved to remote fallback");
            return ResolvedReference::Remote {
                url: remote.url.clone(),
                media_type: remote.media_type(),
            };
        }

        ResolvedReference::Unavailable {
            reason: "no file reference".to_string(),
        }
    }
}
