//! Audit Client
//!
//! One request per audit, no retry. Transport and parse failures are
//! logged with their cause and collapsed into [`LlmError::Analysis`];
//! shape mismatches stay distinguishable as [`LlmError::Schema`].

use crate::{
    AuditTransport, LlmError, LlmResult, PromptBuilder, ResponseValidator, EXPECTED_CHECK_COUNT,
};
use orchestrator_core::{ProjectData, TestResult};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AuditClient {
    transport: Arc<dyn AuditTransport>,
    prompt_builder: PromptBuilder,
    validator: Arc<ResponseValidator>,
}

impl std::fmt::Debug for AuditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditClient")
            .field("model", &self.transport.model_name())
            .field("prompt_builder", &self.prompt_builder)
            .finish_non_exhaustive()
    }
}

impl AuditClient {
    pub fn new(transport: Arc<dyn AuditTransport>, prompt_builder: PromptBuilder) -> LlmResult<Self> {
        Ok(Self {
            transport,
            prompt_builder,
            validator: Arc::new(ResponseValidator::new()?),
        })
    }

    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.prompt_builder
    }

    /// Run the audit for one project
    pub async fn analyze(&self, project: &ProjectData) -> LlmResult<Vec<TestResult>> {
        let prompt = self.prompt_builder.build(project);
        info!(
            "Auditing '{}' ({} files, {} truncated) with {}",
            project.name,
            project.file_count(),
            prompt.truncated_files,
            self.transport.model_name()
        );

        let text = self.transport.complete_json(&prompt.text).await.map_err(|e| {
            error!("Gemini analysis error: {}", e);
            LlmError::Analysis
        })?;

        let results = self.validator.parse(&text).map_err(|e| match e {
            LlmError::Schema(_) => {
                error!("Audit response rejected: {}", e);
                e
            }
            other => {
                error!("Gemini analysis error: {}", other);
                LlmError::Analysis
            }
        })?;

        if results.len() != EXPECTED_CHECK_COUNT {
            warn!(
                "Expected {} audit results, model returned {}",
                EXPECTED_CHECK_COUNT,
                results.len()
            );
        }

        Ok(results)
    }
}
