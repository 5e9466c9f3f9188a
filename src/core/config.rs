//! Provider settings read from the environment (`.env` already loaded).

use std::env;

use crate::core::llm::Provider;

/// Connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Overrides the per-task default model.
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_provider: Provider,
    pub openai: ProviderConfig,
    pub claude: ProviderConfig,
    pub grok: ProviderConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not set; add it to .env to use {provider}")]
    MissingApiKey { provider: Provider, var: &'static str },
    #[error("Unknown provider '{0}' in STUDY_BUDDY_PROVIDER (expected openai, claude or grok)")]
    InvalidProvider(String),
}

impl Config {
    pub fn provider(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Claude => &self.claude,
            Provider::Grok => &self.grok,
        }
    }

    /// API key for `provider`, or the error naming the variable to set.
    pub fn require_key(&self, provider: Provider) -> Result<&str, ConfigError> {
        self.provider(provider)
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey {
                provider,
                var: provider.key_var(),
            })
    }
}

fn provider_config(
    lookup: &impl Fn(&str) -> Option<String>,
    provider: Provider,
    key_vars: &[&str],
    base_var: &str,
    model_var: &str,
) -> ProviderConfig {
    ProviderConfig {
        api_key: key_vars.iter().find_map(|var| lookup(*var)),
        base_url: lookup(base_var).unwrap_or_else(|| provider.default_base_url().to_string()),
        model: lookup(model_var),
    }
}

/// Build configuration from a variable lookup. Empty values count as unset.
pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let default_provider = match lookup("STUDY_BUDDY_PROVIDER") {
        Some(id) => Provider::from_id(&id).ok_or(ConfigError::InvalidProvider(id))?,
        None => Provider::default(),
    };

    Ok(Config {
        default_provider,
        openai: provider_config(
            &lookup,
            Provider::OpenAi,
            &["OPENAI_API_KEY"],
            "OPENAI_BASE_URL",
            "OPENAI_MODEL",
        ),
        claude: provider_config(
            &lookup,
            Provider::Claude,
            &["ANTHROPIC_API_KEY"],
            "ANTHROPIC_BASE_URL",
            "ANTHROPIC_MODEL",
        ),
        grok: provider_config(
            &lookup,
            Provider::Grok,
            &["XAI_API_KEY", "GROK_API_KEY"],
            "XAI_BASE_URL",
            "GROK_MODEL",
        ),
    })
}

/// Load configuration from the environment (after `.env` is applied).
pub fn load() -> Result<Config, ConfigError> {
    from_lookup(|name| env::var(name).ok())
}
