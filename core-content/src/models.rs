//! Domain models for song content
//!
//! This module contains the content records referenced by the performance
//! cache: individual songs (text charts or file-backed sheet music) and the
//! ordered setlists built from them. Records are immutable once loaded into
//! the performance subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub Uuid);

impl ContentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ContentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a setlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetlistId(pub Uuid);

impl SetlistId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SetlistId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SetlistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// How a content item's material is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Text-based material (lyrics, chord charts) carried inline in the record.
    Chart,
    /// File-backed material (sheet-music PDF, scanned image) fetched from a URL.
    MediaFile,
}

/// Declared remote file reference for a file-backed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Full URL of the file in the remote content store.
    pub url: String,
    /// Declared media type (e.g., "application/pdf"), if known.
    pub media_type_hint: Option<String>,
    /// Declared file size in bytes, if known.
    pub file_size: Option<u64>,
}

impl RemoteFile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            media_type_hint: None,
            file_size: None,
        }
    }

    /// Set the declared media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type_hint = Some(media_type.into());
        self
    }

    /// Set the declared file size.
    pub fn with_file_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }

    /// The media type to treat the file as.
    ///
    /// The declared hint is trusted; with no hint the file is treated as an
    /// opaque byte stream.
    pub fn media_type(&self) -> String {
        self.media_type_hint
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }

    /// Validate the reference.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("Remote file URL cannot be empty".to_string());
        }

        Ok(())
    }
}

/// A single song's stored material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique identifier
    pub id: ContentId,
    /// Display title
    pub title: String,
    /// How the material is stored
    pub kind: ContentKind,
    /// Inline text payload (lyrics/chords) for `Chart` items
    pub body: Option<String>,
    /// Remote file reference for `MediaFile` items
    pub remote: Option<RemoteFile>,
    /// Last update time from the repository (Unix epoch seconds)
    pub updated_at: i64,
}

impl ContentItem {
    /// Create a new text-based item with an inline payload.
    pub fn new_chart(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: ContentId::new(),
            title: title.into(),
            kind: ContentKind::Chart,
            body: Some(body.into()),
            remote: None,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Create a new file-backed item.
    ///
    /// `remote` may be `None` for an item whose file was never uploaded; such
    /// an item resolves as unavailable in performance mode.
    pub fn new_media(title: impl Into<String>, remote: Option<RemoteFile>) -> Self {
        Self {
            id: ContentId::new(),
            title: title.into(),
            kind: ContentKind::MediaFile,
            body: None,
            remote,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Returns `true` for text-based items.
    pub fn is_chart(&self) -> bool {
        self.kind == ContentKind::Chart
    }

    /// Returns `true` for file-backed items.
    pub fn is_media_file(&self) -> bool {
        self.kind == ContentKind::MediaFile
    }

    /// Returns `true` if the item declares a remote file reference.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Validate the item.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Content title cannot be empty".to_string());
        }

        match self.kind {
            ContentKind::Chart => {
                if self.body.as_deref().map_or(true, |b| b.trim().is_empty()) {
                    return Err("Chart items must carry a text payload".to_string());
                }
            }
            ContentKind::MediaFile => {
                if let Some(remote) = &self.remote {
                    remote.validate()?;
                }
            }
        }

        Ok(())
    }
}

/// An ordered sequence of content items for one performance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setlist {
    /// Unique identifier
    pub id: SetlistId,
    /// Display name
    pub name: String,
    /// Items in performance order
    pub items: Vec<ContentItem>,
    /// Creation time (Unix epoch seconds)
    pub created_at: i64,
}

impl Setlist {
    pub fn new(name: impl Into<String>, items: Vec<ContentItem>) -> Self {
        Self {
            id: SetlistId::new(),
            name: name.into(),
            items,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ContentItem> {
        self.items.get(index)
    }

    /// Validate the setlist and every item in it.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Setlist name cannot be empty".to_string());
        }

        for item in &self.items {
            item.validate()
                .map_err(|e| format!("Item '{}': {}", item.title, e))?;
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
