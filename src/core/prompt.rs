//! Prompt text for the two generation tasks.
//!
//! Input is capped at [`MAX_INPUT_CHARS`] characters; a marker is appended
//! when the cap cuts it, so the model knows the material is incomplete.

use std::borrow::Cow;
use std::fmt;

use crate::core::util;

/// Longest input (in characters) embedded in a prompt.
pub const MAX_INPUT_CHARS: usize = 15_000;

pub const TEXT_TRUNCATED: &str = "...[text truncated]";
pub const OUTLINE_TRUNCATED: &str = "...[outline truncated]";

/// Question counts offered to the user.
pub const QUESTION_COUNTS: [u32; 5] = [3, 5, 10, 15, 20];
pub const DEFAULT_QUESTION_COUNT: u32 = 5;

pub const QUESTIONS_SYSTEM: &str = "You are an expert tutor for engineering students.";
pub const NOTES_SYSTEM: &str = "You are an expert Nigerian engineering lecturer creating comprehensive study notes for university students.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Easy => "basic understanding and recall of concepts",
            Difficulty::Medium => "application of concepts and medium-level analysis",
            Difficulty::Hard => {
                "deep analysis, synthesis of concepts, and challenging applications"
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// clap value parser for `--count`.
pub fn parse_question_count(s: &str) -> Result<u32, String> {
    let n: u32 = s.trim().parse().map_err(|_| format!("'{}' is not a number", s))?;
    if QUESTION_COUNTS.contains(&n) {
        Ok(n)
    } else {
        Err(format!("question count must be one of {:?}", QUESTION_COUNTS))
    }
}

/// Cap `text` at [`MAX_INPUT_CHARS`], appending `marker` only when cut.
pub fn truncate_input<'a>(text: &'a str, marker: &str) -> Cow<'a, str> {
    let head = util::truncate_chars(text, MAX_INPUT_CHARS);
    if head.len() == text.len() {
        Cow::Borrowed(text)
    } else {
        log::info!(
            "Input exceeds {} characters; truncating for the prompt",
            MAX_INPUT_CHARS
        );
        Cow::Owned(format!("{}{}", head, marker))
    }
}

/// User prompt asking for `count` multiple-choice questions.
pub fn questions_prompt(text: &str, count: u32, difficulty: Difficulty) -> String {
    let text = truncate_input(text, TEXT_TRUNCATED);
    format!(
        r#"You are an expert tutor for engineering students. Create {count} study questions based on the text below.
The questions should be at a {label} difficulty level ({description}).

Each question should:
1. Be relevant to the material
2. Have a single clear, correct answer
3. Help students evaluate their understanding
4. Include an explanation that cites the relevant part of the text

Focus on fundamental concepts and principles, problem-solving approaches, practical applications and mathematical understanding where relevant.

Format each question as a JSON object with this structure:
{{
  "question": "The question text",
  "options": ["Option A", "Option B", "Option C", "Option D"],
  "correctAnswer": "The correct option (full text, identical to one of the options)",
  "explanation": "Detailed explanation of why this is correct"
}}

Return ONLY a JSON array of questions with no additional text.

Here is the text:
{text}"#,
        count = count,
        label = difficulty.label(),
        description = difficulty.description(),
        text = text,
    )
}

/// User prompt asking for structured notes on a course outline.
pub fn notes_prompt(outline: &str) -> String {
    let outline = truncate_input(outline, OUTLINE_TRUNCATED);
    format!(
        r#"You are an experienced Nigerian engineering lecturer. Generate comprehensive study notes for the course outline below.

Notes should follow a typical Nigerian university engineering curriculum and include detailed theoretical explanations, practical applications relevant to the Nigerian engineering context, calculation examples with step-by-step solutions, key formulas, and exam-style insights.

Write every formula with plain human-readable characters (for example Q = mcΔT or (a)/(b)), never LaTeX.

For each topic or section, return one JSON object:
{{
  "topic": "Specific topic or section name",
  "content": "Comprehensive study notes",
  "keyDefinitions": ["Crucial definitions"],
  "importantFormulas": [
    {{
      "formula": "Mathematical representation",
      "explanation": "Breakdown of the formula",
      "exampleCalculation": {{
        "problem": "Specific calculation scenario",
        "solution": "Step-by-step solution with working"
      }}
    }}
  ],
  "practicalApplications": ["Real-world engineering applications"],
  "potentialExamQuestions": ["Sample exam questions"]
}}

Keep the notes academically rigorous, practically oriented, aligned with COREN standards, and written in clear language for engineering students.

Course Outline:
{outline}"#,
        outline = outline,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_borrowed_and_unmarked() {
        let text = "Ohm's law: V = IR";
        let out = truncate_input(text, TEXT_TRUNCATED);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, text);
    }

    #[test]
    fn input_at_limit_is_not_marked() {
        let text = "x".repeat(MAX_INPUT_CHARS);
        assert_eq!(truncate_input(&text, TEXT_TRUNCATED).len(), MAX_INPUT_CHARS);
    }

    #[test]
    fn long_input_is_cut_on_char_boundary() {
        let text = "Δ".repeat(MAX_INPUT_CHARS + 10);
        let out = truncate_input(&text, OUTLINE_TRUNCATED);
        assert!(out.ends_with(OUTLINE_TRUNCATED));
        let body = out.strip_suffix(OUTLINE_TRUNCATED).unwrap();
        assert_eq!(body.chars().count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn questions_prompt_embeds_parameters() {
        let p = questions_prompt("Heat flows.", 10, Difficulty::Hard);
        assert!(p.contains("Create 10 study questions"));
        assert!(p.contains(
            "hard difficulty level (deep analysis, synthesis of concepts, and challenging applications)"
        ));
        assert!(p.contains("\"correctAnswer\""));
        assert!(p.ends_with("Here is the text:\nHeat flows."));
        assert!(!p.contains(TEXT_TRUNCATED));
    }

    #[test]
    fn notes_prompt_marks_long_outline() {
        let outline = "a".repeat(MAX_INPUT_CHARS + 1);
        let p = notes_prompt(&outline);
        assert!(p.contains("\"importantFormulas\""));
        assert!(p.ends_with(OUTLINE_TRUNCATED));
    }

    #[test]
    fn question_count_choices() {
        assert_eq!(parse_question_count("15"), Ok(15));
        assert!(parse_question_count("4").is_err());
        assert!(parse_question_count("five").is_err());
    }

    #[test]
    fn difficulty_default_is_medium() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!(
            Difficulty::Easy.description(),
            "basic understanding and recall of concepts"
        );
    }
}
