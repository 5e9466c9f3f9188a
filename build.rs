//! Build script: validates the embedded demo fixtures at compile time.

use std::path::PathBuf;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct DemoQuestion {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
}

#[derive(serde::Deserialize)]
#[allow(dead_code)]
struct DemoNote {
    topic: String,
    content: String,
}

fn read_fixture(name: &str) -> String {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let path: PathBuf = [&manifest_dir, "config", name].iter().collect();
    println!("cargo:rerun-if-changed={}", path.display());
    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. {} must exist and be valid.",
            path.display(),
            e,
            name
        )
    })
}

fn main() {
    let json = read_fixture("demo-questions.json");
    let questions: Vec<DemoQuestion> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!("demo-questions.json is invalid: {}. Fix the file and rebuild.", e)
    });
    assert!(!questions.is_empty(), "demo-questions.json must not be empty");
    for (i, q) in questions.iter().enumerate() {
        assert_eq!(q.options.len(), 4, "demo question {} needs 4 options", i);
        assert!(
            q.options.contains(&q.correct_answer),
            "demo question {}: correctAnswer must be one of the options",
            i
        );
    }

    let json = read_fixture("demo-notes.json");
    let notes: Vec<DemoNote> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!("demo-notes.json is invalid: {}. Fix the file and rebuild.", e)
    });
    assert!(!notes.is_empty(), "demo-notes.json must not be empty");
    for (i, n) in notes.iter().enumerate() {
        assert!(!n.topic.trim().is_empty(), "demo note {} needs a topic", i);
    }
}
