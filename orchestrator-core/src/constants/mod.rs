//! Constants module for orchestrator core
//!
//! Product limits and score thresholds used throughout the audit pipeline.

pub mod audit_policy;
pub mod health_score_thresholds;

pub use audit_policy::{
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_CHARS, ORCHESTRATOR_VERSION,
    TRUNCATION_MARKER,
};
pub use health_score_thresholds::{HealthBand, HealthScoreThresholds};
