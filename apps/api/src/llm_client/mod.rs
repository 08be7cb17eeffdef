/// LLM Client: the single point of entry for all text-generation calls in Navigator.
///
/// ARCHITECTURAL RULE: No other module may call a text-generation API directly.
/// Every provider implements `TextGenerator` and is reached through a `ProviderChain`.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod chain;
pub mod gemini;
pub mod openai_compat;
pub mod prompts;
#[cfg(test)]
pub mod testing;

pub use chain::{ProviderChain, RawResponse};

use gemini::GeminiClient;
use openai_compat::OpenAiCompatibleClient;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned an error payload: {0}")]
    ErrorPayload(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// The capability every text-generation provider implements.
/// Carried by the chain as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Stable identifier used in logs and in `RawResponse::provider`.
    fn name(&self) -> &str;

    /// Upper bound for a single `generate` call; enforced by the chain.
    fn timeout(&self) -> Duration;

    async fn generate(&self, prompt: &str, system: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    #[serde(alias = "openai", alias = "openai_compatible")]
    OpenAiCompatible,
}

/// Configuration entry describing one text-generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub kind: ProviderKind,
    /// Base URL, without the operation path.
    pub endpoint: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ProviderDescriptor {
    pub fn gemini(api_key: String, model: String, timeout_secs: u64) -> Self {
        Self {
            name: format!("gemini:{model}"),
            kind: ProviderKind::Gemini,
            endpoint: gemini::DEFAULT_ENDPOINT.to_string(),
            model,
            api_key: Some(api_key),
            timeout_secs: Some(timeout_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// Builds the HTTP-backed generator for a descriptor.
pub fn build_generator(descriptor: &ProviderDescriptor) -> Result<Arc<dyn TextGenerator>> {
    let generator: Arc<dyn TextGenerator> = match descriptor.kind {
        ProviderKind::Gemini => Arc::new(
            GeminiClient::new(descriptor)
                .with_context(|| format!("Failed to build provider '{}'", descriptor.name))?,
        ),
        ProviderKind::OpenAiCompatible => Arc::new(
            OpenAiCompatibleClient::new(descriptor)
                .with_context(|| format!("Failed to build provider '{}'", descriptor.name))?,
        ),
    };
    Ok(generator)
}

/// Shared reqwest client construction: the client-level timeout mirrors the
/// descriptor timeout so a stalled body read is also bounded.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
