//! Generation: one prompt in, one completion out, then parse into records.
//!
//! Each provider is a [`Generator`]. The two pipelines ([`generate_questions`],
//! [`generate_notes`]) are provider-agnostic: they build the prompt, make a
//! single request, and run the completion through the parser (and, for notes,
//! the formula normalizer) before shape validation.

mod anthropic;
mod error;
mod openai;

use std::fmt;

use async_trait::async_trait;

use crate::core::config::{Config, ConfigError};
use crate::core::normalize;
use crate::core::parser::{self, ParseError};
use crate::core::prompt::{self, Difficulty};
use crate::core::records::{self, NoteRecord, QuestionRecord};
use crate::core::util;

pub use anthropic::AnthropicGenerator;
pub use error::{GenerationError, ProviderError, map_api_error};
pub use openai::OpenAiCompatible;

/// Characters of the raw completion shown in debug logs.
const RAW_PREVIEW_CHARS: usize = 200;

/// A completion service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Provider {
    #[default]
    #[value(name = "openai")]
    OpenAi,
    Claude,
    Grok,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Claude, Provider::Grok];

    /// Lowercase id used on the command line and in `STUDY_BUDDY_PROVIDER`.
    pub fn id(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Claude => "claude",
            Provider::Grok => "grok",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(id.trim()))
    }

    /// Environment variable holding the API key.
    pub fn key_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::Grok => "XAI_API_KEY",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Claude => "https://api.anthropic.com/v1",
            Provider::Grok => "https://api.x.ai/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::OpenAi => "OpenAI",
            Provider::Claude => "Claude",
            Provider::Grok => "Grok",
        })
    }
}

/// What is being generated. Drives model choice and sampling settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    Questions,
    Notes,
}

impl Task {
    pub fn default_model(self, provider: Provider) -> &'static str {
        match (provider, self) {
            (Provider::OpenAi, _) => "gpt-4o",
            (Provider::Claude, _) => "claude-3-5-sonnet-20240620",
            (Provider::Grok, Task::Questions) => "grok-2-latest",
            (Provider::Grok, Task::Notes) => "grok-3-mini-latest",
        }
    }

    fn system(self) -> &'static str {
        match self {
            Task::Questions => prompt::QUESTIONS_SYSTEM,
            Task::Notes => prompt::NOTES_SYSTEM,
        }
    }

    fn sampling(self, provider: Provider) -> (f32, Option<u32>) {
        match (self, provider) {
            (Task::Questions, Provider::Grok) => (0.0, None),
            (Task::Questions, _) => (0.7, Some(2500)),
            (Task::Notes, _) => (0.7, Some(4000)),
        }
    }
}

/// One completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn for_task(task: Task, provider: Provider, prompt: String) -> Self {
        let (temperature, max_tokens) = task.sampling(provider);
        Self {
            system: task.system().to_string(),
            prompt,
            temperature,
            max_tokens,
        }
    }
}

/// Sends one request and returns the completion text. No retries.
#[async_trait]
pub trait Generator: Send + Sync {
    fn provider(&self) -> Provider;
    fn model(&self) -> &str;
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Build the generator for `provider`, using the model configured for it
/// or the task default.
pub fn generator_for(
    config: &Config,
    provider: Provider,
    task: Task,
) -> Result<Box<dyn Generator>, ConfigError> {
    let settings = config.provider(provider);
    let api_key = config.require_key(provider)?.to_string();
    let model = settings
        .model
        .clone()
        .unwrap_or_else(|| task.default_model(provider).to_string());
    log::info!("Using {} model {}", provider, model);

    Ok(match provider {
        Provider::OpenAi | Provider::Grok => Box::new(OpenAiCompatible::new(
            provider,
            &settings.base_url,
            &api_key,
            model,
        )),
        Provider::Claude => Box::new(AnthropicGenerator::new(
            &settings.base_url,
            api_key,
            model,
        )),
    })
}

async fn complete(
    generator: &dyn Generator,
    task: Task,
    prompt: String,
) -> Result<String, ProviderError> {
    let request = GenerationRequest::for_task(task, generator.provider(), prompt);
    let raw = generator.generate(&request).await?;
    log::debug!(
        "Raw response preview: {}",
        util::preview(&raw, RAW_PREVIEW_CHARS)
    );
    Ok(raw)
}

/// Generate `count` quiz questions from course text.
pub async fn generate_questions(
    generator: &dyn Generator,
    text: &str,
    count: u32,
    difficulty: Difficulty,
) -> Result<Vec<QuestionRecord>, GenerationError> {
    let prompt = prompt::questions_prompt(text, count, difficulty);
    let raw = complete(generator, Task::Questions, prompt).await?;
    let values = parser::parse_records(&raw)?;
    let questions = records::collect_valid(values, QuestionRecord::from_value);
    if questions.is_empty() {
        return Err(ParseError::NoValidObjects.into());
    }
    if questions.len() != count as usize {
        log::info!("Asked for {} questions, got {}", count, questions.len());
    }
    Ok(questions)
}

/// Generate structured study notes from a course outline.
pub async fn generate_notes(
    generator: &dyn Generator,
    outline: &str,
) -> Result<Vec<NoteRecord>, GenerationError> {
    let prompt = prompt::notes_prompt(outline);
    let raw = complete(generator, Task::Notes, prompt).await?;
    let values = parser::parse_records(&raw)?
        .into_iter()
        .map(normalize::normalize_value)
        .collect();
    let notes = records::collect_valid(values, NoteRecord::from_value);
    if notes.is_empty() {
        return Err(ParseError::NoValidObjects.into());
    }
    log::info!("Parsed {} study note(s)", notes.len());
    Ok(notes)
}
