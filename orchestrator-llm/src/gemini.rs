//! Google AI Studio (Gemini) API Integration
//!
//! Sends audit prompts to a Gemini model with JSON output mode enabled.

use crate::{AuditTransport, LlmConfig, LlmError, LlmResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Request structure for Gemini API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

/// Response structure from Gemini API
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
    /// Set on thought-summary parts, which are not part of the answer
    #[serde(default)]
    thought: bool,
}

impl GeminiResponse {
    /// Answer text of the first candidate, thought parts excluded
    fn answer_text(self) -> String {
        let Some(candidate) = self.candidates.into_iter().next() else {
            warn!("Gemini returned no candidates");
            return String::new();
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                warn!("Gemini finished with reason {}", reason);
            }
        }

        candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Gemini API client used as the audit transport
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    thinking_budget: Option<u32>,
    max_output_tokens: Option<u32>,
    client: Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client from config. The key never lives in the config file.
    pub fn new(api_key: impl Into<String>, config: &LlmConfig) -> LlmResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config(
                "Gemini API key is empty (set GEMINI_API_KEY or pass --api-key)".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            thinking_budget: config.thinking_budget,
            max_output_tokens: config.max_output_tokens,
            client,
        })
    }

    /// Point at a different API root (proxies, tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GeminiRequest<'a> {
        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                thinking_config: self
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            },
        }
    }
}

#[async_trait]
impl AuditTransport for GeminiClient {
    async fn complete_json(&self, prompt: &str) -> LlmResult<String> {
        debug!(
            "Sending {} prompt chars to {}",
            prompt.chars().count(),
            self.model
        );

        // Key goes in a header and URLs are stripped from errors so it never reaches logs
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| LlmError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Http(e.without_url()))?;
        Ok(gemini_response.answer_text())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
