//! Model transport seam
//!
//! The audit client only needs "send this prompt, get JSON text back". Any
//! backend (or a test double) can stand behind it.

use crate::LlmResult;
use async_trait::async_trait;

#[async_trait]
pub trait AuditTransport: Send + Sync {
    /// Send one prompt and return the raw response text.
    ///
    /// The backend is asked for `application/json` output. An empty string
    /// means the model produced no text.
    async fn complete_json(&self, prompt: &str) -> LlmResult<String>;

    /// Identifier for logs
    fn model_name(&self) -> &str;
}
