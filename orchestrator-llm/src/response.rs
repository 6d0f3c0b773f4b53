//! Response validation
//!
//! The model is asked for JSON but nothing guarantees the shape. Text is
//! parsed, checked against the audit result schema, and only then
//! deserialized into `TestResult`s.

use crate::{LlmError, LlmResult};
use jsonschema::JSONSchema;
use orchestrator_core::TestResult;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::debug;

/// Violations reported in a schema error before the rest are elided
const MAX_REPORTED_VIOLATIONS: usize = 5;

/// JSON Schema for the array of audit results
pub fn audit_result_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "array",
            "items": {
                "type": "object",
                "required": ["testName", "success", "logs"],
                "properties": {
                    "id": {"type": "string"},
                    "testName": {"type": "string"},
                    "success": {"type": "boolean"},
                    "logs": {"type": "array", "items": {"type": "string"}},
                    "suggestedFix": {"type": ["string", "null"]},
                    "executionTime": {"type": ["number", "null"]},
                    "codeExcerpt": {"type": ["string", "null"]},
                    "fix_patch": {
                        "type": ["object", "null"],
                        "required": ["file", "action", "original_code", "new_code"],
                        "properties": {
                            "file": {"type": "string"},
                            "action": {"enum": ["replace", "insert", "delete"]},
                            "original_code": {"type": "string"},
                            "new_code": {"type": "string"}
                        }
                    }
                }
            }
        })
    })
}

/// Drop a surrounding Markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Skip the info string ("json") on the opening line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

/// Compiled audit result schema
pub struct ResponseValidator {
    schema: JSONSchema,
}

impl std::fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidator").finish_non_exhaustive()
    }
}

impl ResponseValidator {
    pub fn new() -> LlmResult<Self> {
        let schema = JSONSchema::compile(audit_result_schema())
            .map_err(|e| LlmError::Config(format!("Invalid audit result schema: {e}")))?;
        Ok(Self { schema })
    }

    /// Parse raw model output into results.
    ///
    /// Empty output counts as an empty list. Text that is not JSON yields
    /// [`LlmError::Json`]; JSON of the wrong shape yields [`LlmError::Schema`].
    pub fn parse(&self, text: &str) -> LlmResult<Vec<TestResult>> {
        let body = strip_code_fence(text);
        let body = if body.is_empty() { "[]" } else { body };

        let value: Value = serde_json::from_str(body)?;
        self.check(&value)?;

        let results: Vec<TestResult> = serde_json::from_value(value)?;
        debug!("Parsed {} audit results", results.len());
        Ok(results)
    }

    /// Validate an already-parsed value against the schema
    pub fn check(&self, value: &Value) -> LlmResult<()> {
        if let Err(errors) = self.schema.validate(value) {
            let violations: Vec<String> = errors
                .map(|error| {
                    let path = error.instance_path.to_string();
                    let path = if path.is_empty() { "/".to_string() } else { path };
                    format!("{path}: {error}")
                })
                .collect();

            let mut message = violations
                .iter()
                .take(MAX_REPORTED_VIOLATIONS)
                .cloned()
                .collect::<Vec<_>>()
                .join("; ");
            if violations.len() > MAX_REPORTED_VIOLATIONS {
                message.push_str(&format!(
                    " (and {} more)",
                    violations.len() - MAX_REPORTED_VIOLATIONS
                ));
            }
            return Err(LlmError::Schema(message));
        }
        Ok(())
    }
}
