//! Orchestrator Utilities - Shared Helpers
//!
//! Logging setup, configuration file loading and the small text helpers
//! (character-bounded truncation, slugs) used across the audit pipeline.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod logging;
pub mod string;

pub use config::{load_config, merge_configs, ConfigBuilder};
pub use string::{slugify, truncate_chars, Truncated};

/// Result type used throughout the orchestrator utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}
