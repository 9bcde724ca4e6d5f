//! # Resource Lifecycle Management
//!
//! Tracks every locally materialized file handle handed out by the cache and
//! guarantees its release exactly once, including on session teardown.
//!
//! A [`LocalHandle`] is a cheap clonable reference to a file the populator
//! wrote under the app cache directory. The ledger in
//! [`ResourceLifecycleManager`] owns the files themselves: a handle whose
//! entry has been removed from the ledger is "released" and its backing file
//! is gone. Releasing an already-released handle is a no-op, so callers never
//! need to coordinate who revokes last.

use bridge_traits::storage::FileSystemAccess;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique identifier for a materialized handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(Uuid);

impl HandleId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct HandleInner {
    id: HandleId,
    path: PathBuf,
    len: u64,
}

/// Reference to a locally materialized content file.
///
/// Clones share the same identity; equality is by handle id. Whether the
/// backing file still exists is answered by
/// [`ResourceLifecycleManager::is_live`], not by the handle itself.
#[derive(Debug, Clone)]
pub struct LocalHandle {
    inner: Arc<HandleInner>,
}

impl LocalHandle {
    pub fn id(&self) -> HandleId {
        self.inner.id
    }

    /// Path of the backing file. Only valid while the handle is live.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Size of the materialized file in bytes.
    pub fn len(&self) -> u64 {
        self.inner.len
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }
}

impl PartialEq for LocalHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for LocalHandle {}

/// Ledger of live handles with exactly-once release semantics.
pub struct ResourceLifecycleManager {
    fs: Arc<dyn FileSystemAccess>,
    live: Mutex<HashMap<HandleId, PathBuf>>,
    tracked: AtomicU64,
    released: AtomicU64,
}

impl ResourceLifecycleManager {
    pub fn new(fs: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            fs,
            live: Mutex::new(HashMap::new()),
            tracked: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    /// Register a freshly materialized file and return its handle.
    pub fn track(&self, path: PathBuf, len: u64) -> LocalHandle {
        let handle = LocalHandle {
            inner: Arc::new(HandleInner {
                id: HandleId::new(),
                path: path.clone(),
                len,
            }),
        };

        self.live.lock().insert(handle.id(), path);
        self.tracked.fetch_add(1, Ordering::Relaxed);

        debug!(handle = %handle.id(), len, "Tracked handle");
        handle
    }

    /// Returns `true` if the handle has not been released.
    pub fn is_live(&self, handle: &LocalHandle) -> bool {
        self.live.lock().contains_key(&handle.id())
    }

    /// Release a handle and delete its backing file.
    ///
    /// Releasing a handle that was already released is a no-op.
    pub async fn release(&self, handle: &LocalHandle) {
        let path = self.live.lock().remove(&handle.id());

        match path {
            Some(path) => {
                if let Err(e) = self.fs.delete_file(&path).await {
                    // The entry is gone either way; the file may already be deleted.
                    warn!(handle = %handle.id(), path = ?path, error = %e, "Failed to delete released file");
                }
                self.released.fetch_add(1, Ordering::Relaxed);
                debug!(handle = %handle.id(), "Released handle");
            }
            None => {
                debug!(handle = %handle.id(), "Handle already released");
            }
        }
    }

    /// Release a handle that has been superseded by a newer one.
    ///
    /// Alias of [`release`](Self::release); named for call sites where an
    /// entry was replaced or the navigator moved away from the owning item.
    pub async fn supersede(&self, handle: &LocalHandle) {
        self.release(handle).await;
    }

    /// Release every live handle. Used on session teardown.
    pub async fn release_all(&self) {
        let drained: Vec<(HandleId, PathBuf)> = self.live.lock().drain().collect();

        for (id, path) in drained {
            if let Err(e) = self.fs.delete_file(&path).await {
                warn!(handle = %id, path = ?path, error = %e, "Failed to delete released file");
            }
            self.released.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of handles currently live.
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    /// Total handles ever tracked.
    pub fn tracked_count(&self) -> u64 {
        self.tracked.load(Ordering::Relaxed)
    }

    /// Total handles released.
    pub fn released_count(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for ResourceLifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLifecycleManager")
            .field("live", &self.live_count())
            .field("tracked", &self.tracked_count())
            .field("released", &self.released_count())
            .finish()
    }
}
