//! Built-in demo records, used when no provider is configured or a
//! generation fails.
//!
//! Loaded from `config/demo-questions.json` and `config/demo-notes.json`
//! (embedded at compile time, validated by the build script).

use std::sync::OnceLock;

use crate::core::records::{NoteRecord, QuestionRecord};

static QUESTIONS: OnceLock<Vec<QuestionRecord>> = OnceLock::new();
static NOTES: OnceLock<Vec<NoteRecord>> = OnceLock::new();

fn load_questions() -> Vec<QuestionRecord> {
    let json = include_str!("../../config/demo-questions.json");
    serde_json::from_str(json).expect("demo-questions.json must be valid")
}

fn load_notes() -> Vec<NoteRecord> {
    let json = include_str!("../../config/demo-notes.json");
    serde_json::from_str(json).expect("demo-notes.json must be valid")
}

/// The demo question set.
pub fn questions() -> &'static [QuestionRecord] {
    QUESTIONS.get_or_init(load_questions)
}

/// The demo study notes.
pub fn notes() -> &'static [NoteRecord] {
    NOTES.get_or_init(load_notes)
}
