//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the stage platform core:
//! - Logging and tracing infrastructure
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the core runtime utilities that other modules depend on.
//! It establishes the logging conventions and event broadcasting mechanisms
//! used throughout the system.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
pub use events::{CacheEvent, CoreEvent, EventBus, EventStream, PlaybackEvent};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
