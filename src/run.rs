//! Application run modes: logger init, store access, and the generating
//! commands (questions, notes).

use std::io;
use std::path::Path;

use chrono::Utc;

use crate::cli::{GenerateArgs, InputArgs};
use crate::core;
use crate::core::access::{self, Feature};
use crate::core::config::{self, ConfigError};
use crate::core::extract::{self, DocumentKind};
use crate::core::llm::{self, Generator, Task};
use crate::core::prompt::Difficulty;
use crate::core::store::{self, FileStore, KeyValueStore, keys};

/// Initialize env_logger on stderr at the level chosen by -v/-q.
pub fn init_logger(args: &crate::cli::Args) {
    let log_level = args.log_level();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .try_init();
}

/// Open the file store in the data directory, or exit.
pub fn open_store() -> FileStore {
    match FileStore::open_default() {
        Ok(store) => {
            log::debug!("Using data directory {}", store.dir().display());
            store
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Course text from `--file`, `--text`, or stdin.
fn read_input(input: &InputArgs) -> Result<String, Box<dyn std::error::Error>> {
    let text = match (&input.file, &input.text) {
        (Some(path), _) if path.as_os_str() == "-" => io::read_to_string(io::stdin())?,
        (Some(path), _) => extract_file(path, input.format)?,
        (None, Some(text)) => text.clone(),
        (None, None) => io::read_to_string(io::stdin())?,
    };
    Ok(text.trim().to_string())
}

fn extract_file(
    path: &Path,
    format: Option<DocumentKind>,
) -> Result<String, extract::ExtractionError> {
    log::info!("Extracting text from {}", path.display());
    let text = match format {
        Some(kind) => extract::extract_as(path, kind)?,
        None => extract::extract_text(path)?,
    };
    log::info!("Extracted {} characters", text.chars().count());
    Ok(text)
}

fn exit_with(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

/// Refuse to continue when the free tier is used up.
fn ensure_quota(store: &dyn KeyValueStore, feature: Feature) {
    let access = access::check_feature(store, feature, Utc::now());
    if !access.allowed {
        exit_with(access.message.unwrap_or_else(|| "Feature not available".to_string()));
    }
    if let Some(left) = access.usage_left {
        log::info!("{} free {} generation(s) left", left, feature.as_str());
    }
}

/// Provider client for this run, or `None` when no API key is configured
/// (the caller falls back to demo records).
fn select_generator(args: &GenerateArgs, task: Task) -> Option<Box<dyn Generator>> {
    let config = config::load().unwrap_or_else(|e| exit_with(e));
    let provider = args.provider.unwrap_or(config.default_provider);
    match llm::generator_for(&config, provider, task) {
        Ok(generator) => Some(generator),
        Err(e @ ConfigError::MissingApiKey { .. }) => {
            log::warn!("{}", e);
            eprintln!("Using demo content: {}", e);
            None
        }
        Err(e) => exit_with(e),
    }
}

fn describe(generator: &dyn Generator) -> String {
    format!("{} ({})", generator.provider(), generator.model())
}

/// Where a stored record set came from.
enum Source {
    Provider(String),
    Demo,
}

/// Store records under `key`; count usage only for provider output.
fn save<T: serde::Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    records: &[T],
    source: &Source,
    feature: Feature,
) {
    if let Err(e) = store::set_as(store, key, records) {
        exit_with(e);
    }
    if let Source::Provider(_) = source
        && let Err(e) = access::track_usage(store, feature)
    {
        log::warn!("Could not record usage: {}", e);
    }
}

/// Run the `questions` command.
pub async fn run_questions(
    store: &dyn KeyValueStore,
    input: &InputArgs,
    generate: &GenerateArgs,
    count: u32,
    difficulty: Difficulty,
    start_quiz: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (questions, source) = if generate.demo {
        (core::demo::questions().to_vec(), Source::Demo)
    } else {
        ensure_quota(store, Feature::Questions);
        let text = read_input(input).unwrap_or_else(|e| exit_with(e));
        if text.is_empty() {
            exit_with("no course text provided");
        }
        match select_generator(generate, Task::Questions) {
            Some(generator) => {
                eprintln!("Generating {} {} questions...", count, difficulty);
                match llm::generate_questions(generator.as_ref(), &text, count, difficulty).await
                {
                    Ok(questions) => (questions, Source::Provider(describe(generator.as_ref()))),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        eprintln!("Falling back to demo questions.");
                        (core::demo::questions().to_vec(), Source::Demo)
                    }
                }
            }
            None => (core::demo::questions().to_vec(), Source::Demo),
        }
    };

    save(store, keys::QUESTIONS, &questions, &source, Feature::Questions);
    match &source {
        Source::Provider(provider) => println!(
            "Saved {} questions ({}, generated by {})",
            questions.len(),
            difficulty,
            provider
        ),
        Source::Demo => println!("Saved {} questions (demo set)", questions.len()),
    }

    if start_quiz {
        core::cli::run_quiz_on(questions);
    } else {
        core::cli::print_questions(&questions);
        println!("\nRun `study-buddy quiz` to take the quiz.");
    }
    Ok(())
}

/// Run the `notes generate` command.
pub async fn run_notes_generate(
    store: &dyn KeyValueStore,
    input: &InputArgs,
    generate: &GenerateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (notes, source) = if generate.demo {
        (core::demo::notes().to_vec(), Source::Demo)
    } else {
        ensure_quota(store, Feature::Notes);
        let outline = read_input(input).unwrap_or_else(|e| exit_with(e));
        if outline.is_empty() {
            exit_with("no course outline provided");
        }
        match select_generator(generate, Task::Notes) {
            Some(generator) => {
                eprintln!("Generating study notes...");
                match llm::generate_notes(generator.as_ref(), &outline).await {
                    Ok(notes) => (notes, Source::Provider(describe(generator.as_ref()))),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        eprintln!("Falling back to demo notes.");
                        (core::demo::notes().to_vec(), Source::Demo)
                    }
                }
            }
            None => (core::demo::notes().to_vec(), Source::Demo),
        }
    };

    save(store, keys::NOTES, &notes, &source, Feature::Notes);
    core::cli::print_notes(&notes);
    match &source {
        Source::Provider(provider) => {
            eprintln!("\nSaved {} note(s) generated by {}", notes.len(), provider)
        }
        Source::Demo => eprintln!("\nSaved {} note(s) (demo set)", notes.len()),
    }
    Ok(())
}
