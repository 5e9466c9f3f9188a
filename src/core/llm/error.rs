//! Provider and pipeline error types.

use std::sync::OnceLock;

use regex::Regex;

use super::Provider;
use crate::core::parser::ParseError;

/// A single provider request failed: transport, HTTP status, or response shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{provider} request failed: {message}")]
pub struct ProviderError {
    pub provider: Provider,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: Provider, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
        }
    }
}

/// Errors from a generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Failed to parse response: {0}")]
    Parse(#[from] ParseError),
}

/// Map an API or transport error into a ProviderError with a readable message.
pub fn map_api_error<E>(provider: Provider, e: E) -> ProviderError
where
    E: std::fmt::Display,
{
    let s = e.to_string();
    if is_unauthorized(&s) {
        return ProviderError::new(
            provider,
            format!(
                "authentication failed (401). Check {} in .env",
                provider.key_var()
            ),
        );
    }
    if s.contains("\"error\"")
        && let Some((_, rest)) = s.split_once("\"message\":\"")
        && let Some((msg, _)) = rest.split_once('"')
    {
        return ProviderError::new(provider, msg);
    }
    ProviderError::new(provider, s)
}

/// HTTP 401 as reported by reqwest (`401 Unauthorized`), our own `HTTP 401`
/// prefix, or an OpenAI-style `invalid_api_key` code.
fn is_unauthorized(message: &str) -> bool {
    static UNAUTHORIZED: OnceLock<Regex> = OnceLock::new();
    UNAUTHORIZED
        .get_or_init(|| {
            Regex::new(
                r"(?i)\b401 unauthorized\b|\b(?:http|status:?) 401\b|\binvalid_api_key\b",
            )
            .expect("unauthorized pattern")
        })
        .is_match(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_provider() {
        let err = ProviderError::new(Provider::Grok, "timed out");
        assert_eq!(err.to_string(), "Grok request failed: timed out");
    }

    #[test]
    fn map_api_error_401() {
        let err = map_api_error(Provider::Claude, "HTTP 401 Unauthorized");
        assert!(err.message.contains("ANTHROPIC_API_KEY"), "{}", err);
    }

    #[test]
    fn map_api_error_401_forms() {
        for msg in [
            "HTTP status client error (401 Unauthorized) for url (https://api.x.ai/v1)",
            r#"{"error":{"code":"invalid_api_key"}}"#,
            "status: 401",
        ] {
            let err = map_api_error(Provider::Grok, msg);
            assert!(err.message.contains("XAI_API_KEY"), "{}: {}", msg, err);
        }
    }

    #[test]
    fn digits_401_elsewhere_are_not_auth_errors() {
        let err = map_api_error(Provider::OpenAi, "context too long: 4010 tokens, max 4016");
        assert_eq!(err.message, "context too long: 4010 tokens, max 4016");
        let err = map_api_error(Provider::OpenAi, "request id 401-abc timed out");
        assert!(!err.message.contains("OPENAI_API_KEY"), "{}", err);
    }

    #[test]
    fn map_api_error_json_message() {
        let e = std::io::Error::other(r#"429 {"error":{"message":"Rate limit exceeded"}}"#);
        let err = map_api_error(Provider::OpenAi, e);
        assert_eq!(err.message, "Rate limit exceeded");
    }

    #[test]
    fn map_api_error_generic() {
        let e = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = map_api_error(Provider::OpenAi, e);
        assert_eq!(err.message, "connection refused");
    }

    #[test]
    fn generation_error_wraps_parse() {
        let err: GenerationError = ParseError::NoJsonObject.into();
        assert_eq!(
            err.to_string(),
            "Failed to parse response: No JSON object found in content"
        );
    }
}
