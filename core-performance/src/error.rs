//! # Performance Engine Error Types
//!
//! Error types for cache population, resolution, and handle management.

use thiserror::Error;

/// Errors that can occur in the performance cache and playback engine.
#[derive(Error, Debug)]
pub enum PerformanceError {
    // ========================================================================
    // Fetch Errors
    // ========================================================================
    /// Network or server failure while fetching a content file.
    #[error("Fetch failed for {id}: {reason}")]
    FetchFailed { id: String, reason: String },

    /// A fetch attempt exceeded the configured timeout.
    #[error("Fetch timed out for {id}")]
    FetchTimeout { id: String },

    /// The remote store rejected the request (4xx); retrying will not help.
    #[error("Remote store rejected fetch for {id}: HTTP {status}")]
    RemoteRejected { id: String, status: u16 },

    /// The item declares no remote file reference.
    #[error("No file reference declared for {0}")]
    NoFileReference(String),

    // ========================================================================
    // Cache/Handle Errors
    // ========================================================================
    /// A handle was used after its backing file was released.
    #[error("Handle is no longer live: {0}")]
    HandleNotLive(String),

    /// Local cache storage operation failed.
    #[error("Cache storage error: {0}")]
    StorageFailed(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Error from a platform bridge implementation.
    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PerformanceError {
    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PerformanceError::FetchFailed { .. }
                | PerformanceError::FetchTimeout { .. }
                | PerformanceError::Bridge(_)
        )
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            PerformanceError::FetchFailed { .. } | PerformanceError::FetchTimeout { .. }
        )
    }
}

/// Result type for performance engine operations.
pub type Result<T> = std::result::Result<T, PerformanceError>;
