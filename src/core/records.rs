//! Typed views over parsed records: quiz questions and study notes.
//!
//! The parser only guarantees valid JSON; these types check the shape a record
//! must have before the quiz or notes view can use it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of answer options every question must carry.
pub const OPTION_COUNT: usize = 4;

/// Why a parsed record was rejected.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("question has {0} options, expected 4")]
    OptionCount(usize),
    #[error("correct answer \"{0}\" is not one of the options")]
    AnswerNotAnOption(String),
    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),
}

/// A multiple-choice quiz question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl QuestionRecord {
    /// Decode and validate a parsed record.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let record: Self = serde_json::from_value(value)?;
        if record.question.trim().is_empty() {
            return Err(RecordError::EmptyField("question"));
        }
        if record.options.len() != OPTION_COUNT {
            return Err(RecordError::OptionCount(record.options.len()));
        }
        if !record.options.contains(&record.correct_answer) {
            return Err(RecordError::AnswerNotAnOption(record.correct_answer));
        }
        Ok(record)
    }

    /// Index of the correct option.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }
}

/// A worked example attached to a formula.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleCalculation {
    pub problem: String,
    pub solution: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    pub formula: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_calculation: Option<ExampleCalculation>,
}

/// Structured study notes for one topic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub topic: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_definitions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub important_formulas: Option<Vec<Formula>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practical_applications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_exam_questions: Option<Vec<String>>,
}

impl NoteRecord {
    /// Decode and validate a parsed (and normalized) record.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let record: Self = serde_json::from_value(value)?;
        if record.topic.trim().is_empty() {
            return Err(RecordError::EmptyField("topic"));
        }
        Ok(record)
    }
}

/// Validate every parsed record, dropping (and logging) the ones that don't fit.
pub fn collect_valid<T, F>(values: Vec<Value>, decode: F) -> Vec<T>
where
    F: Fn(Value) -> Result<T, RecordError>,
{
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match decode(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Dropping record {}: {}", i, e);
                None
            }
        })
        .collect()
}

fn push_bullets(out: &mut String, heading: &str, items: Option<&Vec<String>>) {
    if let Some(items) = items.filter(|items| !items.is_empty()) {
        out.push_str(heading);
        out.push_str(":\n");
        let lines: Vec<String> = items.iter().map(|item| format!("- {}", item)).collect();
        out.push_str(&lines.join("\n"));
        out.push_str("\n\n");
    }
}

/// Render one note as plain text.
pub fn note_to_text(note: &NoteRecord) -> String {
    let mut out = format!("Topic: {}\n\n{}\n\n", note.topic, note.content);

    push_bullets(&mut out, "Key Definitions", note.key_definitions.as_ref());

    if let Some(formulas) = note.important_formulas.as_ref().filter(|f| !f.is_empty()) {
        let blocks: Vec<String> = formulas
            .iter()
            .map(|f| {
                let mut block = format!(
                    "Formula: {}\nExplanation: {}\n",
                    f.formula, f.explanation
                );
                if let Some(example) = &f.example_calculation {
                    block.push_str(&format!(
                        "Example Calculation:\n  Problem: {}\n  Solution: {}\n",
                        example.problem, example.solution
                    ));
                }
                block
            })
            .collect();
        out.push_str("Important Formulas:\n");
        out.push_str(&blocks.join("\n\n"));
        out.push_str("\n\n");
    }

    push_bullets(
        &mut out,
        "Practical Applications",
        note.practical_applications.as_ref(),
    );
    push_bullets(
        &mut out,
        "Potential Exam Questions",
        note.potential_exam_questions.as_ref(),
    );

    out.trim_end().to_string()
}

/// Render all notes as one plain-text document, separated by rules.
pub fn notes_to_text(notes: &[NoteRecord]) -> String {
    notes
        .iter()
        .map(note_to_text)
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}
