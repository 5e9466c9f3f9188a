//! Commands that work on stored data only: status, notes view/export,
//! quiz, access codes, reset and config.
//!
//! These never call a provider and produce plain text output.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::core::access::{self, Feature, Plan};
use crate::core::config;
use crate::core::llm::{Provider, Task};
use crate::core::paths;
use crate::core::quiz::{self, QuizSession};
use crate::core::records::{self, NoteRecord, QuestionRecord};
use crate::core::store::{self, KeyValueStore, keys};

const WRAP_WIDTH: usize = 88;

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Wrap each line of `text`, keeping its indentation on continuation lines.
pub fn wrap_block(text: &str) -> String {
    text.lines()
        .map(|line| {
            let indent_len = line.len() - line.trim_start().len();
            let indent = &line[..indent_len];
            textwrap::fill(
                line.trim_start(),
                textwrap::Options::new(WRAP_WIDTH)
                    .initial_indent(indent)
                    .subsequent_indent(indent),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a question set without revealing answers.
pub fn print_questions(questions: &[QuestionRecord]) {
    for (i, q) in questions.iter().enumerate() {
        println!("\n{}. {}", i + 1, wrap_block(&q.question));
        for (letter, option) in ['A', 'B', 'C', 'D'].iter().zip(&q.options) {
            println!("   {}) {}", letter, option);
        }
    }
}

pub fn print_notes(notes: &[NoteRecord]) {
    println!("{}", wrap_block(&records::notes_to_text(notes)));
}

fn load_questions(store: &dyn KeyValueStore) -> Vec<QuestionRecord> {
    store::get_as::<Vec<QuestionRecord>>(store, keys::QUESTIONS)
        .unwrap_or_else(|e| fail(e))
        .unwrap_or_default()
}

fn load_notes(store: &dyn KeyValueStore) -> Vec<NoteRecord> {
    store::get_as::<Vec<NoteRecord>>(store, keys::NOTES)
        .unwrap_or_else(|e| fail(e))
        .unwrap_or_default()
}

/// Run the `quiz` command on the stored question set.
pub fn run_quiz(store: &dyn KeyValueStore) {
    run_quiz_on(load_questions(store));
}

/// Play `questions` interactively on stdin/stdout.
pub fn run_quiz_on(questions: Vec<QuestionRecord>) {
    let mut session = QuizSession::new(questions);
    if session.is_empty() {
        fail("no stored questions. Run `study-buddy questions` first");
    }
    let stdin = io::stdin();
    match quiz::run_interactive(&mut session, stdin.lock(), io::stdout()) {
        Ok(summary) => log::info!(
            "Quiz {}: {}/{} ({}%) in {}",
            if summary.completed { "finished" } else { "stopped" },
            summary.score,
            summary.total,
            summary.percentage,
            quiz::format_elapsed(summary.elapsed_secs)
        ),
        Err(e) => fail(e),
    }
}

/// Run the `notes show` command.
pub fn run_notes_show(store: &dyn KeyValueStore) {
    let notes = load_notes(store);
    if notes.is_empty() {
        println!("No study notes yet. Run `study-buddy notes generate` first.");
        return;
    }
    print_notes(&notes);
}

/// Run the `notes export` command: write notes as plain text to `output`.
pub fn run_notes_export(store: &dyn KeyValueStore, output: &Path) {
    let notes = load_notes(store);
    if notes.is_empty() {
        fail("no stored study notes to export");
    }
    let mut text = records::notes_to_text(&notes);
    text.push('\n');
    if let Err(e) = fs::write(output, text) {
        fail(format!("cannot write {}: {}", output.display(), e));
    }
    println!("Exported {} note(s) to {}", notes.len(), output.display());
}

/// Run the `status` command: plan and free-tier usage.
pub fn run_status(store: &dyn KeyValueStore) {
    let status = access::status(store, Utc::now()).unwrap_or_else(|e| fail(e));
    match &status.subscription {
        Some(sub) => println!(
            "Plan:       {} (active until {})",
            sub.plan,
            format_date(sub.expires_at)
        ),
        None => println!("Plan:       free tier"),
    }
    for feature in [Feature::Notes, Feature::Questions] {
        let used = status.usage.used(feature);
        let label = format!("{}:", capitalize(feature.as_str()));
        if status.is_subscribed() {
            println!("{:<11} {} generated", label, used);
        } else {
            let limit = feature.free_limit();
            println!(
                "{:<11} {} of {} free generations used",
                label,
                used.min(limit),
                limit
            );
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Run the `redeem` command.
pub fn run_redeem(store: &dyn KeyValueStore, code: &str) {
    match access::redeem_code(store, code, Utc::now()) {
        Ok(sub) => println!(
            "Access code redeemed. {} plan active until {}.",
            sub.plan,
            format_date(sub.expires_at)
        ),
        Err(e) => fail(e),
    }
}

/// Run the `issue-code` command.
pub fn run_issue_code(store: &dyn KeyValueStore, email: &str, plan: Plan) {
    if !email.contains('@') {
        fail(format!("'{}' is not an email address", email));
    }
    match access::issue_code(store, email, plan, Utc::now()) {
        Ok(code) => {
            println!("{}", code.code);
            println!(
                "{} plan for {}, redeemable until {}",
                code.plan,
                code.email,
                format_date(code.expires_at)
            );
        }
        Err(e) => fail(e),
    }
}

/// Run the `reset` command.
pub fn run_reset(store: &dyn KeyValueStore, all: bool) {
    let mut cleared = vec![keys::QUESTIONS, keys::NOTES];
    if all {
        cleared.extend([keys::USAGE_STATS, keys::SUBSCRIPTION, keys::ACCESS_CODES]);
    }
    for key in &cleared {
        if let Err(e) = store.delete(key) {
            fail(e);
        }
    }
    println!("Cleared: {}", cleared.join(", "));
}

/// Run the `config` command: display paths and provider status.
pub fn run_config() {
    let show = |p: Option<std::path::PathBuf>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("Data:       {}", show(paths::data_dir()));
    println!("Env file:   {}", show(paths::env_file()));

    let config = match config::load() {
        Ok(c) => c,
        Err(e) => fail(e),
    };
    println!("Provider:   {} (default)", config.default_provider);
    for provider in Provider::ALL {
        let settings = config.provider(provider);
        let key = if settings.api_key.is_some() {
            "set ✓"
        } else {
            "not set"
        };
        let model = settings.model.clone().unwrap_or_else(|| {
            let (q, n) = (
                Task::Questions.default_model(provider),
                Task::Notes.default_model(provider),
            );
            if q == n { q.to_string() } else { format!("{} / {}", q, n) }
        });
        println!(
            "{:<11} {} = {}, model {}, {}",
            format!("{}:", provider),
            provider.key_var(),
            key,
            model,
            settings.base_url
        );
    }
}
