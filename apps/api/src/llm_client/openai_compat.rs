//! OpenAI-compatible `/chat/completions` client, used for the fallback tier
//! (OpenRouter free models, Hugging Face router, local servers).

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, GenerationError, ProviderDescriptor, TextGenerator, MAX_TOKENS};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiCompatibleClient {
    client: Client,
    name: String,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OpenAiCompatibleClient {
    pub fn new(descriptor: &ProviderDescriptor) -> Result<Self> {
        let timeout = descriptor.timeout();
        Ok(Self {
            client: http_client(timeout)?,
            name: descriptor.name.clone(),
            endpoint: descriptor.endpoint.trim_end_matches('/').to_string(),
            model: descriptor.model.clone(),
            api_key: descriptor.api_key.clone(),
            timeout,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(&self, prompt: &str, system: &str) -> Result<String, GenerationError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("{} responded with {} bytes", self.name, body.len());
        parse_chat_completion(&body)
    }
}

fn parse_chat_completion(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)?;

    if let Some(error) = parsed.error {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(GenerationError::ErrorPayload(message));
    }

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyContent);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_choice_content() {
        let body = r#"{"choices": [
            {"message": {"role": "assistant", "content": "first"}},
            {"message": {"role": "assistant", "content": "second"}}
        ]}"#;
        assert_eq!(parse_chat_completion(body).unwrap(), "first");
    }

    #[test]
    fn test_parse_error_object_is_error_payload() {
        let body = r#"{"error": {"message": "Rate limit exceeded: free-models-per-day", "code": 429}}"#;
        match parse_chat_completion(body) {
            Err(GenerationError::ErrorPayload(msg)) => assert!(msg.contains("Rate limit")),
            other => panic!("expected error payload, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_null_content_is_empty() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert!(matches!(
            parse_chat_completion(body),
            Err(GenerationError::EmptyContent)
        ));
    }
}
