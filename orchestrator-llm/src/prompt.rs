//! Prompt Builder
//!
//! Condenses `ProjectData` into the single request sent to the model. Each
//! file body is cut to a character budget so large projects stay inside the
//! context window; anything past the budget is silently lost.

use crate::response::audit_result_schema;
use orchestrator_core::{CoreConfig, ProjectData, ProjectFile, DEFAULT_MAX_FILE_CHARS, TRUNCATION_MARKER};
use orchestrator_utils::truncate_chars;
use serde_json::Value;

/// The fixed audit checks, in the order the model is asked to run them
pub const AUDIT_CHECKS: [&str; 10] = [
    "Logic",
    "Mounting",
    "Dependencies",
    "XSS",
    "Bundle Size",
    "First-Contentful-Paint",
    "Accessibility",
    "SEO",
    "Mobile",
    "Quality",
];

/// Results the model is contractually expected to return
pub const EXPECTED_CHECK_COUNT: usize = AUDIT_CHECKS.len();

const RESPONSE_SHAPE: &str = r#"[
  {
    "id": string,
    "testName": string,
    "success": boolean,
    "logs": string[],
    "suggestedFix": string (detailed text explanation),
    "executionTime": number (ms),
    "codeExcerpt": string (problematic code block),
    "fix_patch": {
      "file": string (path to file),
      "action": "replace" | "insert" | "delete",
      "original_code": string (the exact string to find),
      "new_code": string (the code to replace it with)
    }
  }
]"#;

/// A built request plus the schema its answer must satisfy
#[derive(Debug, Clone)]
pub struct AuditPrompt {
    pub text: String,
    pub schema: &'static Value,
    /// Files whose body was cut to the budget
    pub truncated_files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    max_file_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_CHARS)
    }
}

impl From<&CoreConfig> for PromptBuilder {
    fn from(config: &CoreConfig) -> Self {
        Self::new(config.max_file_chars)
    }
}

impl PromptBuilder {
    pub fn new(max_file_chars: usize) -> Self {
        Self { max_file_chars }
    }

    pub fn max_file_chars(&self) -> usize {
        self.max_file_chars
    }

    /// Render one file as `FILE: <path>\nCONTENT:\n<content>\n---`.
    ///
    /// Returns the block and whether the body was cut.
    pub fn summarize_file(&self, file: &ProjectFile) -> (String, bool) {
        let cut = truncate_chars(&file.content, self.max_file_chars);
        let marker = if cut.was_cut { TRUNCATION_MARKER } else { "" };
        (
            format!("FILE: {}\nCONTENT:\n{}{}\n---", file.path, cut.text, marker),
            cut.was_cut,
        )
    }

    pub fn build(&self, project: &ProjectData) -> AuditPrompt {
        let mut truncated_files = 0;
        let blocks: Vec<String> = project
            .files
            .iter()
            .map(|file| {
                let (block, was_cut) = self.summarize_file(file);
                truncated_files += usize::from(was_cut);
                block
            })
            .collect();

        let checks = AUDIT_CHECKS
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {}", i + 1, name))
            .collect::<Vec<_>>()
            .join(" ");

        let text = format!(
            "Analyze the following software project: \"{name}\".\n\
             Files provided:\n\
             {files}\n\
             \n\
             You are a Senior Staff QA Engineer. Perform exactly {count} core audit tests.\n\
             For each test, provide a unique ID (e.g., 'logic-01'), name, success status, \
             detailed logs, and a suggested fix if it fails.\n\
             \n\
             CRITICAL: For failed tests, you MUST include a \"fix_patch\" object that provides \
             a structured code replacement.\n\
             \n\
             Tests to run:\n\
             {checks}.\n\
             \n\
             Return the results strictly as a JSON array of objects with the following schema:\n\
             {shape}\n",
            name = project.name,
            files = blocks.join("\n"),
            count = EXPECTED_CHECK_COUNT,
            checks = checks,
            shape = RESPONSE_SHAPE,
        );

        AuditPrompt {
            text,
            schema: audit_result_schema(),
            truncated_files,
        }
    }
}
