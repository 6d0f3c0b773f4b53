//! Orchestrator Analysis - Report Assembly and Export
//!
//! This crate turns an ordered list of audit results into the exportable
//! report: navigation index, keyed result map, metadata, plus the health
//! score and the JSON/Markdown renderings written by the CLI.

#![warn(clippy::all, clippy::pedantic)]

pub mod export;
pub mod health_score;
pub mod report;

// Re-export main types for convenience
pub use export::{export_file_name, ReportExporter, ReportFormat};
pub use health_score::HealthScore;
pub use report::{
    AuditReport, NavigationEntry, ReportAssembler, ReportConfig, ReportMetadata,
    DEFAULT_AGENT_INSTRUCTION,
};

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, orchestrator_core::Error>;
