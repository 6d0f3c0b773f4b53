//! Report Assembler
//!
//! Builds the exportable audit report from an ordered result list. Pure
//! and synchronous; the result count and shape are taken as given.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use orchestrator_core::{ProjectData, TestResult, ORCHESTRATOR_VERSION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a downstream agent should use the exported report
pub const DEFAULT_AGENT_INSTRUCTION: &str = "You are the Tech Lead. \
1. Print the 'navigation' list. \
2. Wait for a TEST NUMBER to review. \
3. If the user asks for a 'FIX' or 'FIX JSON' for a number, output the block \
from the 'fix_patch' field as a plain JSON object.";

const PASS_STATUS: &str = "✅ PASS";
const FAIL_STATUS: &str = "❌ FAIL";

/// Report settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Instruction embedded in every report's metadata
    pub agent_instruction: String,
    /// Directory reports are written to
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            agent_instruction: DEFAULT_AGENT_INSTRUCTION.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub project_name: String,
    pub timestamp: DateTime<Utc>,
    pub orchestrator_version: String,
    pub agent_instruction: String,
}

/// One line of the report's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    /// 1-based position
    pub number: usize,
    pub id: String,
    pub name: String,
    /// `✅ PASS` or `❌ FAIL`
    pub status: String,
}

/// The exported document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub metadata: ReportMetadata,
    pub navigation: Vec<NavigationEntry>,
    /// Keyed by the 1-based position as a string, in order
    pub results: IndexMap<String, TestResult>,
}

impl AuditReport {
    pub fn passed(&self) -> usize {
        self.results.values().filter(|r| r.success).count()
    }

    /// Look up a result by its navigation number
    pub fn result(&self, number: usize) -> Option<&TestResult> {
        self.results.get(&number.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ReportAssembler {
    agent_instruction: String,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_AGENT_INSTRUCTION)
    }
}

impl From<&ReportConfig> for ReportAssembler {
    fn from(config: &ReportConfig) -> Self {
        Self::new(config.agent_instruction.clone())
    }
}

impl ReportAssembler {
    pub fn new(agent_instruction: impl Into<String>) -> Self {
        Self {
            agent_instruction: agent_instruction.into(),
        }
    }

    /// Assemble with the current time
    pub fn assemble(&self, project: &ProjectData, results: &[TestResult]) -> AuditReport {
        self.assemble_at(project, results, Utc::now())
    }

    pub fn assemble_at(
        &self,
        project: &ProjectData,
        results: &[TestResult],
        timestamp: DateTime<Utc>,
    ) -> AuditReport {
        let navigation = results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let number = i + 1;
                NavigationEntry {
                    number,
                    id: if result.id.is_empty() {
                        format!("test-{number}")
                    } else {
                        result.id.clone()
                    },
                    name: result.test_name.clone(),
                    status: if result.success { PASS_STATUS } else { FAIL_STATUS }.to_string(),
                }
            })
            .collect();

        let results = results
            .iter()
            .enumerate()
            .map(|(i, result)| ((i + 1).to_string(), result.clone()))
            .collect();

        AuditReport {
            metadata: ReportMetadata {
                project_name: project.name.clone(),
                timestamp,
                orchestrator_version: ORCHESTRATOR_VERSION.to_string(),
                agent_instruction: self.agent_instruction.clone(),
            },
            navigation,
            results,
        }
    }
}
