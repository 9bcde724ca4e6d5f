//! # Content Domain Models
//!
//! Domain models for song content: lyric/chord charts, sheet-music files, and
//! the setlists that order them for a performance.
//!
//! ## Overview
//!
//! Content records are owned by the remote content repository (out of scope
//! for this workspace); the performance cache references them without copying.
//! This crate defines:
//! - The content models ([`ContentItem`](models::ContentItem),
//!   [`Setlist`](models::Setlist)) and their validation
//! - The [`ContentRepository`](repository::ContentRepository) trait seam the
//!   rest of the core consumes

pub mod error;
pub mod models;
pub mod repository;

pub use error::{ContentError, Result};
pub use models::{ContentId, ContentItem, ContentKind, RemoteFile, Setlist, SetlistId};
pub use repository::ContentRepository;
