//! Anthropic Messages API over plain HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{GenerationRequest, Generator, Provider, ProviderError, map_api_error};
use crate::core::message;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);
/// The Messages API requires `max_tokens`.
const DEFAULT_MAX_TOKENS: u32 = 2500;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

pub struct AnthropicGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl AnthropicGenerator {
    pub fn new(base_url: &str, api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: format!("{}/messages", base_url.trim_end_matches('/')),
            api_key,
            model,
        }
    }

    fn err(&self, message: impl Into<String>) -> ProviderError {
        ProviderError::new(Provider::Claude, message)
    }
}

#[async_trait]
impl Generator for AnthropicGenerator {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            system: &request.system,
            messages: [UserMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.err(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(map_api_error(
                Provider::Claude,
                format!("HTTP {}: {}", status, text),
            ));
        }

        let value: Value = resp.json().await.map_err(|e| self.err(e.to_string()))?;
        message::extract_content(&value).ok_or_else(|| self.err("response has no text content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url() {
        let g = AnthropicGenerator::new(
            "https://api.anthropic.com/v1/",
            "key".to_string(),
            "claude-3-5-sonnet-20240620".to_string(),
        );
        assert_eq!(g.endpoint, "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn request_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 2500,
            temperature: 0.7,
            system: "sys",
            messages: [UserMessage {
                role: "user",
                content: "hi",
            }],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["max_tokens"], 2500);
        assert_eq!(v["system"], "sys");
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"], "hi");
    }
}
