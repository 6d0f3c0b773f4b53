//! Orchestrator LLM - Model-Facing Half of the Audit Pipeline
//!
//! This crate turns extracted project data into an audit by a hosted model:
//! - Prompt construction with per-file truncation
//! - The `AuditTransport` seam and its Gemini implementation
//! - Response parsing with JSON Schema validation
//! - The audit client that collapses failures into typed errors
//! - The orchestration state machine sequencing extraction and analysis

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audit_client;
pub mod audit_fsm;
pub mod gemini;
pub mod prompt;
pub mod response;
pub mod transport;

pub use audit_client::AuditClient;
pub use audit_fsm::{AppStatus, AuditEvent, AuditOrchestrator, AuditState};
pub use gemini::GeminiClient;
pub use prompt::{AuditPrompt, PromptBuilder, AUDIT_CHECKS, EXPECTED_CHECK_COUNT};
pub use response::{audit_result_schema, ResponseValidator};
pub use transport::AuditTransport;

/// Shown to the user for every transport or parse failure of an audit
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to analyze project. Context might be too large or the model is overloaded.";

/// Shown when a failure carries no message of its own
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred during the audit.";

/// Default Gemini REST endpoint
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Result type for LLM operations
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Error types for LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Generic audit failure; the cause is logged, not surfaced
    #[error("{}", ANALYSIS_FAILED_MESSAGE)]
    Analysis,

    /// The response was JSON but not an array of audit results
    #[error("Model response did not match the audit result schema: {0}")]
    Schema(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the model API
    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction failed
    #[error(transparent)]
    Core(#[from] orchestrator_core::Error),

    /// Event does not apply to the current state
    #[error("Cannot apply {event} while {status}")]
    InvalidTransition { status: AppStatus, event: String },

    /// A second audit was started while one is running
    #[error("An audit is already in progress ({0})")]
    AuditInProgress(AppStatus),

    /// The run was reset or replaced before it finished
    #[error("Audit of '{archive_name}' was superseded by a reset or a newer run")]
    Superseded { archive_name: String },
}

/// Model and transport settings
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,
    /// API root, without trailing `/models`
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Thinking token budget, omitted from the request when `None`
    pub thinking_budget: Option<u32>,
    /// Output cap, omitted from the request when `None`
    pub max_output_tokens: Option<u32>,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-pro-preview".to_string(),
            base_url: GEMINI_API_BASE_URL.to_string(),
            temperature: 0.2,
            thinking_budget: Some(4000),
            max_output_tokens: None,
            timeout_secs: 300,
        }
    }
}

impl LlmConfig {
    pub fn validate(&self) -> LlmResult<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LlmError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::Config("model must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(LlmError::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}
