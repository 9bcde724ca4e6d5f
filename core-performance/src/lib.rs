//! # Performance Mode Engine
//!
//! Offline content cache and playback navigation for live performance.
//!
//! ## Overview
//!
//! A musician on stage must be able to move between songs in a setlist with
//! no visible latency and no dependency on network availability. This crate
//! keeps a bounded set of "currently relevant" performance files available
//! for zero-latency access and degrades gracefully when a file could not be
//! fetched:
//! - Proactive cache population when a setlist is loaded
//! - Synchronous cache-first resolution with remote fallback
//! - Generation-counted navigation that discards stale async results
//! - Guaranteed release of every materialized file handle
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            PerformanceSession               │
//! │  - warm_setlist()      - navigate()         │
//! │  - resolve_current()   - teardown()         │
//! └──────┬──────────────┬───────────────────────┘
//!        │              │
//!        │              ├──> PlaybackNavigator ──> CacheResolver
//!        │              │                              │
//!        └──> CachePopulator ──────> FileCacheStore <──┘
//!                 │                       │
//!                 │                       └──> ResourceLifecycleManager
//!                 ├──> HttpClient (bridge)
//!                 └──> FileSystemAccess (bridge)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_performance::{PerformanceConfig, PerformanceSession, NavigationRequest};
//!
//! # async fn example(http: Arc<dyn HttpClient>, fs: Arc<dyn FileSystemAccess>,
//! #                  setlist: Vec<ContentItem>) -> core_performance::Result<()> {
//! let session = PerformanceSession::new(PerformanceConfig::default(), http, fs)?;
//! session.initialize().await?;
//!
//! // Entering performance mode: fire-and-forget cache population
//! session.load_setlist(setlist.clone()).await;
//! session.warm_setlist(setlist);
//!
//! // Stage navigation never waits on the network
//! session.navigate(NavigationRequest::Next).await;
//! let display = session.resolve_current();
//!
//! // Leaving performance mode releases every materialized handle
//! session.teardown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod navigator;
pub mod populator;
pub mod resolver;
pub mod session;
pub mod stats;
pub mod store;

pub use config::PerformanceConfig;
pub use error::{PerformanceError, Result};
pub use lifecycle::{HandleId, LocalHandle, ResourceLifecycleManager};
pub use navigator::{ItemDisplay, NavigationRequest, PlaybackNavigator, PlaybackPosition};
pub use populator::{CachePopulator, WarmMode, WarmOutcome, WarmSummary};
pub use resolver::{CacheResolver, ResolvedReference};
pub use session::PerformanceSession;
pub use stats::CacheStats;
pub use store::{CacheEntry, FileCacheStore};
