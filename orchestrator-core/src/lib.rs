//! Orchestrator Core - Audit Data Model and Project Extraction
//!
//! This crate provides the pieces of the audit pipeline that do not talk to
//! the model:
//! - The data model shared by every stage (`ProjectData`, `TestResult`, ...)
//! - Policy constants and the configurable `CoreConfig`
//! - The archive extractor and its injectable `ArchiveReader`

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
)]
#![allow(
    clippy::module_name_repetitions,  // Often necessary for clarity
)]

pub mod constants;
pub mod extractors;
pub mod models;

pub use constants::{
    audit_policy::{
        DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_CHARS,
        ORCHESTRATOR_VERSION, TRUNCATION_MARKER,
    },
    health_score_thresholds::{HealthBand, HealthScoreThresholds},
};
pub use extractors::archive::{
    ensure_zip_name, ArchiveError, ArchiveExtractor, ArchiveReader, ExtractionPolicy, RawEntry,
    ZipArchiveReader,
};
pub use models::{FixPatch, PatchAction, ProjectData, ProjectFile, TestResult};

/// Result type used throughout orchestrator core
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for orchestrator core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Archive could not be read or decoded
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task died before producing a result
    #[error("Background task failed: {0}")]
    Task(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extraction and prompt budget policy
///
/// The defaults are the product limits (50 files, 2000 chars); all of them can be
/// overridden from a config file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Maximum number of files kept from one archive
    pub max_files: usize,
    /// Maximum characters of each file sent to the model
    pub max_file_chars: usize,
    /// File extensions (without the dot, lowercase) worth auditing
    pub allowed_extensions: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_chars: DEFAULT_MAX_FILE_CHARS,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

impl CoreConfig {
    /// Reject limits that would make every audit empty
    pub fn validate(&self) -> Result<()> {
        if self.max_files == 0 {
            return Err(Error::Config("max_files must be at least 1".to_string()));
        }
        if self.max_file_chars == 0 {
            return Err(Error::Config("max_file_chars must be at least 1".to_string()));
        }
        if self.allowed_extensions.is_empty() {
            return Err(Error::Config("allowed_extensions must not be empty".to_string()));
        }
        Ok(())
    }
}
