//! # Playback Navigator
//!
//! State machine driving which song and page is "current" during a
//! performance. Every transition bumps a monotonically increasing generation
//! counter *before* any asynchronous work starts, so a fast double-navigation
//! abandons the first resolution in favor of the second: a resolution carries
//! the generation it was issued under, and [`PlaybackNavigator::apply`]
//! discards any payload whose generation no longer matches.
//!
//! No public operation here returns an error. A song that cannot be resolved
//! shows as [`ItemDisplay::Failed`] and the musician can always move on to
//! the next one.

use crate::lifecycle::{LocalHandle, ResourceLifecycleManager};
use crate::resolver::{CacheResolver, ResolvedReference};
use crate::store::FileCacheStore;
use core_content::ContentItem;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Current playback position within the active setlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackPosition {
    /// Setlist index of the current item.
    pub index: usize,
    /// Page within the current item.
    ///
    /// The page count of a rendered file is only known to the viewer, so the
    /// upper bound is not clamped here; the lower bound is.
    pub page: usize,
    /// Strictly increasing navigation generation.
    pub generation: u64,
}

/// Display state of the current item.
#[derive(Debug, Clone)]
pub enum ItemDisplay {
    /// A resolution is in flight for the current generation.
    Loading,
    /// A reference is available for rendering.
    Ready(ResolvedReference),
    /// Nothing could be resolved; shown as "no content available".
    Failed(String),
}

impl ItemDisplay {
    pub fn is_loading(&self) -> bool {
        matches!(self, ItemDisplay::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ItemDisplay::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemDisplay::Failed(_))
    }
}

/// Navigation operations driven by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationRequest {
    Next,
    Previous,
    Jump(usize),
    NextPage,
    PreviousPage,
}

struct NavigatorState {
    setlist: Vec<ContentItem>,
    position: PlaybackPosition,
    display: ItemDisplay,
    /// Handle currently handed to the viewer, if the display is cache-backed.
    displayed_handle: Option<LocalHandle>,
}

/// State machine over [`PlaybackPosition`] resolving each transition against
/// the cache.
pub struct PlaybackNavigator {
    resolver: CacheResolver,
    store: Arc<FileCacheStore>,
    lifecycle: Arc<ResourceLifecycleManager>,
    state: Mutex<NavigatorState>,
}

impl PlaybackNavigator {
    pub fn new(store: Arc<FileCacheStore>, lifecycle: Arc<ResourceLifecycleManager>) -> Self {
        Self {
            resolver: CacheResolver::new(store.clone()),
            store,
            lifecycle,
            state: Mutex::new(NavigatorState {
                setlist: Vec::new(),
                position: PlaybackPosition {
                    index: 0,
                    page: 0,
                    generation: 0,
                },
                display: ItemDisplay::Failed("no setlist loaded".to_string()),
                displayed_handle: None,
            }),
        }
    }

    /// Replace the active setlist and resolve its first item.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn load_setlist(&self, items: Vec<ContentItem>) -> PlaybackPosition {
        let (position, orphan) = {
            let mut state = self.state.lock();
            state.setlist = items;
            state.position = PlaybackPosition {
                index: 0,
                page: 0,
                generation: state.position.generation + 1,
            };
            let orphan = self.resolve_current_locked(&mut state);
            (state.position, orphan)
        };

        self.release_orphan(orphan).await;
        position
    }

    /// Apply a navigation request and resolve the new current item.
    ///
    /// Requests clamp at the setlist boundaries; a boundary no-op is still
    /// acknowledged with a fresh generation. Infallible by design.
    pub async fn navigate(&self, request: NavigationRequest) -> PlaybackPosition {
        let (position, orphan) = {
            let mut state = self.state.lock();

            // The generation is bumped before any resolution so that results
            // issued under an older generation can be recognized as stale.
            state.position.generation += 1;

            if state.setlist.is_empty() {
                debug!(?request, "Navigation with no setlist loaded");
                return state.position;
            }

            let max_index = state.setlist.len() - 1;
            let current = state.position;
            let (index, page) = match request {
                NavigationRequest::Next => {
                    let index = current.index.saturating_add(1).min(max_index);
                    // A boundary no-op keeps the page; an item change resets it.
                    (index, if index != current.index { 0 } else { current.page })
                }
                NavigationRequest::Previous => {
                    let index = current.index.saturating_sub(1);
                    (index, if index != current.index { 0 } else { current.page })
                }
                NavigationRequest::Jump(target) => (target.min(max_index), 0),
                NavigationRequest::NextPage => (current.index, current.page + 1),
                NavigationRequest::PreviousPage => {
                    (current.index, current.page.saturating_sub(1))
                }
            };

            state.position.index = index;
            state.position.page = page;

            debug!(
                index = state.position.index,
                page = state.position.page,
                generation = state.position.generation,
                ?request,
                "Navigated"
            );

            let orphan = self.resolve_current_locked(&mut state);
            (state.position, orphan)
        };

        self.release_orphan(orphan).await;
        position
    }

    /// Commit an asynchronously produced display for a given generation.
    ///
    /// Returns `false` (and drops the payload) when the generation has been
    /// superseded by a later navigation. This does not release handles; the
    /// store and teardown paths own that.
    pub fn apply(&self, generation: u64, display: ItemDisplay) -> bool {
        let mut state = self.state.lock();

        if generation != state.position.generation {
            debug!(
                stale = generation,
                current = state.position.generation,
                "Stale resolution discarded"
            );
            return false;
        }

        state.displayed_handle = match &display {
            ItemDisplay::Ready(ResolvedReference::Cached { handle, .. }) => Some(handle.clone()),
            _ => None,
        };
        state.display = display;
        true
    }

    /// Re-resolve the current item under a fresh generation.
    ///
    /// Useful after a warm pass completes while an item is showing its remote
    /// fallback. Returns `false` if no setlist is loaded or the resolution
    /// lost to a concurrent navigation.
    pub async fn refresh(&self) -> bool {
        let (generation, item) = {
            let mut state = self.state.lock();
            if state.setlist.is_empty() {
                return false;
            }
            state.position.generation += 1;
            state.display = ItemDisplay::Loading;
            (
                state.position.generation,
                state.setlist[state.position.index].clone(),
            )
        };

        let display = Self::display_for(self.resolver.resolve(&item));
        self.apply(generation, display)
    }

    /// Snapshot of the current item's display state.
    pub fn resolve_current(&self) -> ItemDisplay {
        self.state.lock().display.clone()
    }

    /// Snapshot of the current position.
    pub fn position(&self) -> PlaybackPosition {
        self.state.lock().position
    }

    /// The current content item, if a setlist is loaded.
    pub fn current_item(&self) -> Option<ContentItem> {
        let state = self.state.lock();
        state.setlist.get(state.position.index).cloned()
    }

    /// Number of items in the active setlist.
    pub fn setlist_len(&self) -> usize {
        self.state.lock().setlist.len()
    }

    /// Drop the setlist and release any orphaned displayed handle.
    pub async fn reset(&self) {
        let orphan = {
            let mut state = self.state.lock();
            state.setlist.clear();
            state.position = PlaybackPosition {
                index: 0,
                page: 0,
                generation: state.position.generation + 1,
            };
            state.display = ItemDisplay::Failed("no setlist loaded".to_string());
            state
                .displayed_handle
                .take()
                .filter(|handle| !self.store.owns_handle(handle))
        };

        self.release_orphan(orphan).await;
    }

    /// Resolve the item at the current position and install its display.
    ///
    /// Returns the previously displayed handle when it is no longer backed by
    /// the store (evicted or replaced while displayed) and therefore needs a
    /// release from the navigator.
    fn resolve_current_locked(&self, state: &mut NavigatorState) -> Option<LocalHandle> {
        let previous = state.displayed_handle.take();

        let display = match state.setlist.get(state.position.index) {
            Some(item) => Self::display_for(self.resolver.resolve(item)),
            None => ItemDisplay::Failed("empty setlist".to_string()),
        };

        state.displayed_handle = match &display {
            ItemDisplay::Ready(ResolvedReference::Cached { handle, .. }) => Some(handle.clone()),
            _ => None,
        };
        state.display = display;

        previous
            .filter(|handle| state.displayed_handle.as_ref() != Some(handle))
            .filter(|handle| !self.store.owns_handle(handle))
    }

    async fn release_orphan(&self, orphan: Option<LocalHandle>) {
        if let Some(handle) = orphan {
            self.lifecycle.supersede(&handle).await;
        }
    }

    fn display_for(resolved: ResolvedReference) -> ItemDisplay {
        match resolved {
            ResolvedReference::Unavailable { reason } => ItemDisplay::Failed(reason),
            available => ItemDisplay::Ready(available),
        }
    }
}
