//! Quiz session: one pass over a question set with scoring and feedback.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use crate::core::records::QuestionRecord;

const WRAP_WIDTH: usize = 80;
const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// State of a quiz in progress.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuestionRecord>,
    current: usize,
    selected: Option<usize>,
    answered: bool,
    score: usize,
    completed: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self {
            questions,
            current: 0,
            selected: None,
            answered: false,
            score: 0,
            completed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Zero-based index of the current question.
    pub fn index(&self) -> usize {
        self.current
    }

    /// The question being asked, or `None` once completed.
    pub fn current(&self) -> Option<&QuestionRecord> {
        if self.completed {
            return None;
        }
        self.questions.get(self.current)
    }

    /// Choose an option. Ignored after the answer was checked or if out of range.
    pub fn select(&mut self, option: usize) -> bool {
        let in_range = self
            .current()
            .is_some_and(|q| option < q.options.len());
        if self.answered || !in_range {
            return false;
        }
        self.selected = Some(option);
        true
    }

    /// Check the selection. Returns whether it was correct, or `None` when
    /// nothing is selected or the question was already checked.
    pub fn check(&mut self) -> Option<bool> {
        if self.answered {
            return None;
        }
        let selected = self.selected?;
        let question = self.current()?;
        let correct = question.options[selected] == question.correct_answer;
        self.answered = true;
        if correct {
            self.score += 1;
        }
        Some(correct)
    }

    /// Move to the next question, completing the quiz after the last one.
    pub fn next(&mut self) {
        if self.completed {
            return;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
            self.answered = false;
        } else {
            self.completed = true;
        }
    }

    pub fn restart(&mut self) {
        self.current = 0;
        self.selected = None;
        self.answered = false;
        self.score = 0;
        self.completed = false;
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Score as a rounded percentage of the question count.
    pub fn percentage(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        ((self.score as f64 / self.questions.len() as f64) * 100.0).round() as u32
    }

    pub fn feedback(&self) -> &'static str {
        feedback_for(self.percentage())
    }
}

/// Feedback line for a final percentage.
pub fn feedback_for(percentage: u32) -> &'static str {
    match percentage {
        90.. => "Excellent! You've mastered this material.",
        70..=89 => "Good job! You have a solid understanding of the material.",
        50..=69 => "You're making progress! Consider reviewing the material again.",
        _ => "This material needs more review. Don't give up!",
    }
}

/// `MM:SS` for an elapsed number of seconds.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Result of an interactive run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub elapsed_secs: u64,
    pub completed: bool,
}

fn read_trimmed<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn parse_choice(answer: &str, option_count: usize) -> Option<usize> {
    let mut chars = answer.chars();
    let c = chars.next()?.to_ascii_uppercase();
    if chars.next().is_some() {
        return None;
    }
    OPTION_LETTERS[..option_count.min(OPTION_LETTERS.len())]
        .iter()
        .position(|&l| l == c)
        .or_else(|| {
            c.to_digit(10)
                .map(|d| d as usize)
                .filter(|&d| d >= 1 && d <= option_count)
                .map(|d| d - 1)
        })
}

/// Play the quiz on a line-based terminal. `q` quits; EOF ends the run.
pub fn run_interactive<R: BufRead, W: Write>(
    session: &mut QuizSession,
    mut input: R,
    mut out: W,
) -> io::Result<QuizSummary> {
    let mut started = Instant::now();

    'quiz: loop {
        while let Some(question) = session.current().cloned() {
            writeln!(
                out,
                "\nQuestion {} of {}   (score: {})",
                session.index() + 1,
                session.len(),
                session.score()
            )?;
            writeln!(out, "{}", textwrap::fill(&question.question, WRAP_WIDTH))?;
            for (letter, option) in OPTION_LETTERS.iter().zip(&question.options) {
                writeln!(out, "  {}) {}", letter, option)?;
            }

            loop {
                write!(out, "Your answer [A-D, q to quit]: ")?;
                out.flush()?;
                let Some(answer) = read_trimmed(&mut input)? else {
                    break 'quiz;
                };
                if answer.eq_ignore_ascii_case("q") {
                    break 'quiz;
                }
                match parse_choice(&answer, question.options.len()) {
                    Some(choice) => {
                        session.select(choice);
                        break;
                    }
                    None => writeln!(out, "Please answer with a letter from A to D.")?,
                }
            }

            match session.check() {
                Some(true) => writeln!(out, "✓ Correct!")?,
                _ => {
                    let letter = question
                        .correct_index()
                        .map(|i| OPTION_LETTERS[i].to_string())
                        .unwrap_or_default();
                    writeln!(
                        out,
                        "✗ Incorrect. Correct answer: {}) {}",
                        letter, question.correct_answer
                    )?;
                }
            }
            writeln!(
                out,
                "{}",
                textwrap::fill(&format!("Explanation: {}", question.explanation), WRAP_WIDTH)
            )?;
            session.next();
        }

        let elapsed = started.elapsed().as_secs();
        writeln!(out, "\nQuiz Completed!")?;
        writeln!(out, "{}%", session.percentage())?;
        writeln!(
            out,
            "You scored {} out of {}",
            session.score(),
            session.len()
        )?;
        writeln!(out, "Time taken: {}", format_elapsed(elapsed))?;
        writeln!(out, "{}", session.feedback())?;

        write!(out, "\nRetake the quiz? [y/N] ")?;
        out.flush()?;
        match read_trimmed(&mut input)? {
            Some(a) if a.eq_ignore_ascii_case("y") || a.eq_ignore_ascii_case("yes") => {
                session.restart();
                started = Instant::now();
            }
            _ => {
                writeln!(out)?;
                break;
            }
        }
    }

    Ok(QuizSummary {
        score: session.score(),
        total: session.len(),
        percentage: session.percentage(),
        elapsed_secs: started.elapsed().as_secs(),
        completed: session.is_completed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn question(n: usize) -> QuestionRecord {
        QuestionRecord {
            question: format!("Question {}?", n),
            options: vec![
                "right".to_string(),
                "wrong 1".to_string(),
                "wrong 2".to_string(),
                "wrong 3".to_string(),
            ],
            correct_answer: "right".to_string(),
            explanation: "Because.".to_string(),
        }
    }

    fn session(n: usize) -> QuizSession {
        QuizSession::new((1..=n).map(question).collect())
    }

    #[test]
    fn scoring_flow() {
        let mut s = session(2);
        assert_eq!(s.check(), None, "nothing selected yet");
        assert!(s.select(0));
        assert_eq!(s.check(), Some(true));
        assert!(!s.select(1), "selection locked after checking");
        assert_eq!(s.check(), None, "cannot score twice");
        s.next();

        assert!(s.select(2));
        assert_eq!(s.check(), Some(false));
        s.next();

        assert!(s.is_completed());
        assert!(s.current().is_none());
        assert_eq!(s.score(), 1);
        assert_eq!(s.percentage(), 50);
        assert_eq!(
            s.feedback(),
            "You're making progress! Consider reviewing the material again."
        );
    }

    #[test]
    fn restart_resets_everything() {
        let mut s = session(1);
        s.select(0);
        s.check();
        s.next();
        s.restart();
        assert!(!s.is_completed());
        assert_eq!(s.score(), 0);
        assert_eq!(s.index(), 0);
        assert_eq!(s.check(), None, "selection cleared");
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let mut s = session(1);
        assert!(!s.select(4));
        assert_eq!(s.check(), None);
    }

    #[test]
    fn feedback_thresholds() {
        assert_eq!(feedback_for(100), "Excellent! You've mastered this material.");
        assert_eq!(feedback_for(90), "Excellent! You've mastered this material.");
        assert_eq!(
            feedback_for(70),
            "Good job! You have a solid understanding of the material."
        );
        assert_eq!(
            feedback_for(50),
            "You're making progress! Consider reviewing the material again."
        );
        assert_eq!(
            feedback_for(49),
            "This material needs more review. Don't give up!"
        );
    }

    #[test]
    fn percentage_rounds() {
        let mut s = session(3);
        s.select(0);
        s.check();
        assert_eq!(s.percentage(), 33);
        s.next();
        s.select(0);
        s.check();
        assert_eq!(s.percentage(), 67);
        assert_eq!(QuizSession::new(vec![]).percentage(), 0);
    }

    #[test]
    fn elapsed_format() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3600), "60:00");
    }

    #[test]
    fn parse_choice_letters_and_digits() {
        assert_eq!(parse_choice("a", 4), Some(0));
        assert_eq!(parse_choice("D", 4), Some(3));
        assert_eq!(parse_choice("2", 4), Some(1));
        assert_eq!(parse_choice("5", 4), None);
        assert_eq!(parse_choice("ab", 4), None);
        assert_eq!(parse_choice("", 4), None);
    }

    #[test]
    fn interactive_run_to_completion() {
        let mut s = session(2);
        let input = Cursor::new("x\na\nc\nn\n");
        let mut out = Vec::new();
        let summary = run_interactive(&mut s, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(summary.completed);
        assert_eq!((summary.score, summary.total, summary.percentage), (1, 2, 50));
        assert!(text.contains("Please answer with a letter from A to D."));
        assert!(text.contains("✓ Correct!"));
        assert!(text.contains("✗ Incorrect. Correct answer: A) right"));
        assert!(text.contains("You scored 1 out of 2"));
    }

    #[test]
    fn interactive_quit_early() {
        let mut s = session(3);
        let summary = run_interactive(&mut s, Cursor::new("a\nq\n"), Vec::new()).unwrap();
        assert!(!summary.completed);
        assert_eq!(summary.score, 1);
    }

    #[test]
    fn interactive_retake() {
        let mut s = session(1);
        let input = Cursor::new("b\ny\na\n");
        let summary = run_interactive(&mut s, input, Vec::new()).unwrap();
        assert!(summary.completed);
        assert_eq!(summary.score, 1);
    }
}
