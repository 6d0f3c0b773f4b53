//! Data models module for orchestrator core
//!
//! Structures exchanged between extraction, analysis and reporting. Field
//! names on the wire follow the model's response contract exactly.

pub mod audit_result;
pub mod project;

pub use audit_result::{FixPatch, PatchAction, TestResult};
pub use project::{ProjectData, ProjectFile};
