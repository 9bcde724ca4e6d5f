//! Tests for the playback navigator state machine: clamping, generation
//! monotonicity, and stale-result discard.

mod common;

use common::{media_item, orphan_media_item, FakeFileSystem};
use core_content::ContentItem;
use core_performance::{
    FileCacheStore, ItemDisplay, NavigationRequest, PlaybackNavigator, ResolvedReference,
    ResourceLifecycleManager,
};
use std::path::PathBuf;
use std::sync::Arc;

struct Fixture {
    store: Arc<FileCacheStore>,
    lifecycle: Arc<ResourceLifecycleManager>,
    navigator: PlaybackNavigator,
}

fn fixture() -> Fixture {
    let lifecycle = Arc::new(ResourceLifecycleManager::new(Arc::new(FakeFileSystem::new())));
    let store = Arc::new(FileCacheStore::new(lifecycle.clone()));
    let navigator = PlaybackNavigator::new(store.clone(), lifecycle.clone());

    Fixture {
        store,
        lifecycle,
        navigator,
    }
}

fn charts(n: usize) -> Vec<ContentItem> {
    (0..n)
        .map(|i| ContentItem::new_chart(format!("Song {i}"), format!("lyrics {i}")))
        .collect()
}

#[tokio::test]
async fn next_and_previous_clamp_at_boundaries() {
    let f = fixture();
    f.navigator.load_setlist(charts(3)).await;

    for _ in 0..5 {
        f.navigator.navigate(NavigationRequest::Next).await;
    }
    assert_eq!(f.navigator.position().index, 2);

    for _ in 0..5 {
        f.navigator.navigate(NavigationRequest::Previous).await;
    }
    assert_eq!(f.navigator.position().index, 0);
}

#[tokio::test]
async fn boundary_noop_is_acknowledged_with_fresh_generation() {
    let f = fixture();
    f.navigator.load_setlist(charts(2)).await;

    let before = f.navigator.position();
    let after = f.navigator.navigate(NavigationRequest::Previous).await;

    assert_eq!(after.index, before.index);
    assert!(after.generation > before.generation);
    assert!(f.navigator.resolve_current().is_ready());
}

#[tokio::test]
async fn jump_clamps_never_wraps() {
    let f = fixture();
    f.navigator.load_setlist(charts(3)).await;

    let position = f.navigator.navigate(NavigationRequest::Jump(99)).await;
    assert_eq!(position.index, 2);

    let position = f.navigator.navigate(NavigationRequest::Jump(1)).await;
    assert_eq!(position.index, 1);
}

#[tokio::test]
async fn generation_strictly_increases_on_every_navigation() {
    let f = fixture();
    f.navigator.load_setlist(charts(3)).await;

    let mut last = f.navigator.position().generation;
    for request in [
        NavigationRequest::Next,
        NavigationRequest::NextPage,
        NavigationRequest::PreviousPage,
        NavigationRequest::Previous,
        NavigationRequest::Jump(2),
        NavigationRequest::Previous,
    ] {
        let position = f.navigator.navigate(request).await;
        assert!(
            position.generation > last,
            "generation must increase on {request:?}"
        );
        last = position.generation;
    }
}

#[tokio::test]
async fn stale_apply_is_discarded() {
    let f = fixture();
    f.navigator.load_setlist(charts(3)).await;

    let first = f.navigator.navigate(NavigationRequest::Next).await;
    let second = f.navigator.navigate(NavigationRequest::Next).await;

    // A resolution issued under the first generation arrives late.
    let applied = f.navigator.apply(
        first.generation,
        ItemDisplay::Failed("late failure".to_string()),
    );
    assert!(!applied);

    // The display still reflects the current item, not the stale payload.
    match f.navigator.resolve_current() {
        ItemDisplay::Ready(ResolvedReference::Chart { body }) => {
            assert_eq!(body, "lyrics 2");
        }
        other => panic!("expected Ready(Chart), got {other:?}"),
    }

    // A payload carrying the current generation is applied.
    let applied = f
        .navigator
        .apply(second.generation, ItemDisplay::Loading);
    assert!(applied);
    assert!(f.navigator.resolve_current().is_loading());
}

#[tokio::test]
async fn rapid_triple_next_settles_on_the_last_target() {
    let f = fixture();
    f.navigator.load_setlist(charts(5)).await;

    let g1 = f.navigator.navigate(NavigationRequest::Next).await.generation;
    let g2 = f.navigator.navigate(NavigationRequest::Next).await.generation;
    let g3 = f.navigator.navigate(NavigationRequest::Next).await.generation;
    assert!(g1 < g2 && g2 < g3);

    // Slow resolutions for the two superseded generations arrive afterwards;
    // neither may touch the displayed state.
    assert!(!f
        .navigator
        .apply(g1, ItemDisplay::Failed("slow first".to_string())));
    assert!(!f
        .navigator
        .apply(g2, ItemDisplay::Failed("slow second".to_string())));

    assert_eq!(f.navigator.position().index, 3);
    match f.navigator.resolve_current() {
        ItemDisplay::Ready(ResolvedReference::Chart { body }) => assert_eq!(body, "lyrics 3"),
        other => panic!("expected the third item's chart, got {other:?}"),
    }
}

#[tokio::test]
async fn page_turns_reset_on_item_change_and_clamp_at_zero() {
    let f = fixture();
    f.navigator.load_setlist(charts(2)).await;

    f.navigator.navigate(NavigationRequest::NextPage).await;
    f.navigator.navigate(NavigationRequest::NextPage).await;
    assert_eq!(f.navigator.position().page, 2);

    f.navigator.navigate(NavigationRequest::PreviousPage).await;
    assert_eq!(f.navigator.position().page, 1);

    // Moving to another item starts at its first page.
    f.navigator.navigate(NavigationRequest::Next).await;
    assert_eq!(f.navigator.position().page, 0);

    // The lower bound clamps.
    f.navigator.navigate(NavigationRequest::PreviousPage).await;
    assert_eq!(f.navigator.position().page, 0);
}

#[tokio::test]
async fn empty_setlist_navigation_is_a_safe_noop() {
    let f = fixture();

    let before = f.navigator.position();
    let after = f.navigator.navigate(NavigationRequest::Next).await;

    assert_eq!(after.index, 0);
    assert!(after.generation > before.generation);
    assert!(f.navigator.resolve_current().is_failed());
}

#[tokio::test]
async fn cache_hit_displays_cached_and_survives_clear() {
    let f = fixture();
    let item = media_item("PDF song", "https://x/1.pdf", "application/pdf");

    let handle = f.lifecycle.track(PathBuf::from("/fake-cache/1.bin"), 8);
    f.store.put(item.id, handle.clone(), "application/pdf").await;

    f.navigator.load_setlist(vec![item]).await;
    match f.navigator.resolve_current() {
        ItemDisplay::Ready(reference) => assert!(reference.is_cached()),
        other => panic!("expected cached display, got {other:?}"),
    }

    // Clearing the cache revokes the handle but leaves the display intact.
    f.store.clear().await;
    assert!(!f.lifecycle.is_live(&handle));
    assert!(f.navigator.resolve_current().is_ready());

    // The next navigation re-resolves and falls back to the remote reference.
    f.navigator.navigate(NavigationRequest::Next).await;
    match f.navigator.resolve_current() {
        ItemDisplay::Ready(reference) => assert!(reference.is_remote()),
        other => panic!("expected remote fallback, got {other:?}"),
    }

    // The handle was released exactly once despite the navigator also
    // superseding it on the way out.
    assert_eq!(f.lifecycle.tracked_count(), 1);
    assert_eq!(f.lifecycle.released_count(), 1);
}

#[tokio::test]
async fn unresolvable_item_fails_without_blocking_navigation() {
    let f = fixture();
    let items = vec![
        ContentItem::new_chart("Song 0", "lyrics"),
        orphan_media_item("Song 1"),
        ContentItem::new_chart("Song 2", "more lyrics"),
    ];
    f.navigator.load_setlist(items).await;

    f.navigator.navigate(NavigationRequest::Next).await;
    match f.navigator.resolve_current() {
        ItemDisplay::Failed(reason) => assert_eq!(reason, "no file reference"),
        other => panic!("expected failed display, got {other:?}"),
    }

    // The failure never traps the musician on the broken song.
    f.navigator.navigate(NavigationRequest::Next).await;
    assert_eq!(f.navigator.position().index, 2);
    assert!(f.navigator.resolve_current().is_ready());
}

#[tokio::test]
async fn refresh_picks_up_a_late_cache_fill() {
    let f = fixture();
    let item = media_item("PDF song", "https://x/1.pdf", "application/pdf");
    f.navigator.load_setlist(vec![item.clone()]).await;

    // Not cached yet: remote fallback.
    match f.navigator.resolve_current() {
        ItemDisplay::Ready(reference) => assert!(reference.is_remote()),
        other => panic!("expected remote fallback, got {other:?}"),
    }

    // The populator fills the cache while the item is displayed.
    let handle = f.lifecycle.track(PathBuf::from("/fake-cache/1.bin"), 8);
    f.store.put(item.id, handle, "application/pdf").await;

    assert!(f.navigator.refresh().await);
    match f.navigator.resolve_current() {
        ItemDisplay::Ready(reference) => assert!(reference.is_cached()),
        other => panic!("expected cached display after refresh, got {other:?}"),
    }
}
