//! Report export
//!
//! Pretty JSON for agents, Markdown for people. File names derive from the
//! project name so repeated exports of one project overwrite each other.

use crate::{AuditReport, HealthScore, Result};
use orchestrator_core::{Error, TestResult};
use orchestrator_utils::slugify;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

const FILE_PREFIX: &str = "ai-agent-v7-report-";

/// Which renderings to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Markdown,
    Both,
}

impl ReportFormat {
    fn includes_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }

    fn includes_markdown(self) -> bool {
        matches!(self, Self::Markdown | Self::Both)
    }
}

/// `ai-agent-v7-report-<slug>.json`, slug being the lowercased project
/// name with whitespace runs turned into `-`
pub fn export_file_name(project_name: &str) -> String {
    format!("{FILE_PREFIX}{}.json", slugify(project_name))
}

fn markdown_file_name(project_name: &str) -> String {
    format!("{FILE_PREFIX}{}.md", slugify(project_name))
}

pub struct ReportExporter;

impl ReportExporter {
    /// Pretty JSON with two-space indent
    pub fn to_json(report: &AuditReport) -> Result<String> {
        serde_json::to_string_pretty(report).map_err(Error::Json)
    }

    pub fn from_json(text: &str) -> Result<AuditReport> {
        serde_json::from_str(text).map_err(Error::Json)
    }

    /// Markdown rendering of the on-screen report
    pub fn to_markdown(report: &AuditReport) -> String {
        let mut markdown = String::new();
        let score = HealthScore::from_counts(report.passed(), report.results.len());

        markdown.push_str("# AI Agent Audit Report\n\n");
        let _ = writeln!(markdown, "**Project:** {}", report.metadata.project_name);
        let _ = writeln!(
            markdown,
            "**Timestamp:** {}",
            report.metadata.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            markdown,
            "**Orchestrator:** v{}\n",
            report.metadata.orchestrator_version
        );

        markdown.push_str("## Health Score\n\n");
        let _ = writeln!(markdown, "**{score}**\n");

        markdown.push_str("## Navigation\n\n");
        markdown.push_str("| # | ID | Test | Status |\n");
        markdown.push_str("|---|----|------|--------|\n");
        for entry in &report.navigation {
            let _ = writeln!(
                markdown,
                "| {} | {} | {} | {} |",
                entry.number, entry.id, entry.name, entry.status
            );
        }
        markdown.push('\n');

        for (entry, result) in report.navigation.iter().zip(report.results.values()) {
            let _ = writeln!(
                markdown,
                "## {}. {} ({})\n",
                entry.number, entry.name, entry.id
            );
            Self::render_result(&mut markdown, result);
        }

        markdown
    }

    fn render_result(markdown: &mut String, result: &TestResult) {
        let _ = writeln!(
            markdown,
            "**Status:** {}",
            if result.success { "PASSED" } else { "FAILED" }
        );
        if let Some(ms) = result.execution_time {
            let _ = writeln!(markdown, "**Execution Time:** {ms}ms");
        }
        markdown.push('\n');

        if !result.logs.is_empty() {
            markdown.push_str("### Logs\n\n");
            for line in &result.logs {
                let _ = writeln!(markdown, "- {line}");
            }
            markdown.push('\n');
        }

        if let Some(fix) = &result.suggested_fix {
            let _ = writeln!(markdown, "### Suggested Fix\n\n{fix}\n");
        }

        if let Some(excerpt) = &result.code_excerpt {
            let _ = writeln!(markdown, "### Code Excerpt\n\n```\n{excerpt}\n```\n");
        }

        if let Some(patch) = &result.fix_patch {
            let _ = writeln!(
                markdown,
                "### Fix Patch\n\n**File:** `{}`  \n**Action:** {}\n",
                patch.file, patch.action
            );
            let _ = writeln!(markdown, "Original:\n\n```\n{}\n```\n", patch.original_code);
            let _ = writeln!(markdown, "Replacement:\n\n```\n{}\n```\n", patch.new_code);
        }
    }

    /// Write the requested renderings into `dir`, returning the paths
    pub fn write(report: &AuditReport, dir: &Path, format: ReportFormat) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        if format.includes_json() {
            let path = dir.join(export_file_name(&report.metadata.project_name));
            std::fs::write(&path, Self::to_json(report)?)?;
            written.push(path);
        }

        if format.includes_markdown() {
            let path = dir.join(markdown_file_name(&report.metadata.project_name));
            std::fs::write(&path, Self::to_markdown(report))?;
            written.push(path);
        }

        for path in &written {
            info!("Report written to {}", path.display());
        }
        Ok(written)
    }
}
