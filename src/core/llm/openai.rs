//! OpenAI-compatible chat completions (OpenAI and xAI Grok).

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_trait::async_trait;
use serde_json::{Value, json};

use super::{GenerationRequest, Generator, Provider, ProviderError, map_api_error};
use crate::core::message;

pub struct OpenAiCompatible {
    provider: Provider,
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatible {
    pub fn new(provider: Provider, base_url: &str, api_key: &str, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key);
        Self {
            provider,
            client: Client::with_config(config),
            model,
        }
    }

    fn body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl Generator for OpenAiCompatible {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let response: Value = self
            .client
            .chat()
            .create_byot(self.body(request))
            .await
            .map_err(|e| map_api_error(self.provider, e))?;

        message::first_choice_content(&response).ok_or_else(|| {
            ProviderError::new(self.provider, "response has no choices[0].message.content")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_includes_max_tokens_only_when_set() {
        let generator = OpenAiCompatible::new(
            Provider::Grok,
            "https://api.x.ai/v1",
            "key",
            "grok-2-latest".to_string(),
        );
        let mut request = GenerationRequest {
            system: "sys".to_string(),
            prompt: "hello".to_string(),
            temperature: 0.0,
            max_tokens: None,
        };
        let body = generator.body(&request);
        assert_eq!(body["model"], "grok-2-latest");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert!(body.get("max_tokens").is_none());

        request.max_tokens = Some(4000);
        assert_eq!(generator.body(&request)["max_tokens"], 4000);
    }
}
