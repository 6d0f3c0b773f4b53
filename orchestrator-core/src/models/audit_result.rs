//! Audit results as returned by the model

use serde::{Deserialize, Serialize};

/// Kind of edit a fix patch proposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchAction {
    Replace,
    Insert,
    Delete,
}

impl std::fmt::Display for PatchAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchAction::Replace => write!(f, "replace"),
            PatchAction::Insert => write!(f, "insert"),
            PatchAction::Delete => write!(f, "delete"),
        }
    }
}

/// Advisory structured code edit attached to a failed check.
///
/// Never applied by the orchestrator; it is carried through to the export
/// for downstream agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixPatch {
    /// Path of the file to edit
    pub file: String,
    pub action: PatchAction,
    /// Exact text to locate
    pub original_code: String,
    /// Replacement text
    pub new_code: String,
}

/// Outcome of one audit check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Model-assigned identifier such as `logic-01`; may be empty
    #[serde(default)]
    pub id: String,
    pub test_name: String,
    pub success: bool,
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// Reported duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_excerpt: Option<String>,
    #[serde(rename = "fix_patch", default, skip_serializing_if = "Option::is_none")]
    pub fix_patch: Option<FixPatch>,
}

impl TestResult {
    /// A failed check that carries a structured patch
    pub const fn is_patchable(&self) -> bool {
        !self.success && self.fix_patch.is_some()
    }
}
