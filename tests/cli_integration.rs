//! Integration tests that run the CLI binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const ENV_VARS: [&str; 11] = [
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "XAI_API_KEY",
    "GROK_API_KEY",
    "STUDY_BUDDY_PROVIDER",
    "OPENAI_MODEL",
    "ANTHROPIC_MODEL",
    "GROK_MODEL",
    "OPENAI_BASE_URL",
    "ANTHROPIC_BASE_URL",
    "XAI_BASE_URL",
];

/// Binary with no provider keys, its store under `home/data`, run from `home`
/// so dotenv() won't load a `.env` from the project root.
fn bin(home: &Path) -> Command {
    // CARGO_BIN_EXE_<name> uses the binary target name; hyphens require concat! for env!()
    let bin = env!(concat!("CARGO_BIN_EXE_study", "-", "buddy"));
    let mut cmd = Command::new(bin);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("STUDY_BUDDY_DATA_DIR", home.join("data"))
        .current_dir(home);
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    bin(home)
        .args(args)
        .output()
        .expect("binary not found - run cargo build first")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output) {
    assert!(output.status.success(), "stderr: {}", stderr(output));
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["--help"]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("questions") && out.contains("notes"), "{}", out);
}

#[test]
fn cli_version_succeeds() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["--version"]);
    assert_success(&output);
    assert!(stdout(&output).contains("study-buddy"));
}

#[test]
fn demo_questions_are_stored() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["questions", "--demo", "--text", "Ohm's law"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Saved 5 questions (demo set)"));
    assert!(tmp.path().join("data").join("questions.json").exists());
}

#[test]
fn notes_without_api_key_fall_back_to_demo() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(
        tmp.path(),
        &["notes", "generate", "--text", "Thermodynamics: heat, work, energy"],
    );
    assert_success(&output);
    assert!(stdout(&output).contains("Topic: Introduction to Thermodynamics"));
    assert!(stderr(&output).contains("OPENAI_API_KEY"));

    // Demo output does not count against the free tier.
    let status = run(tmp.path(), &["status"]);
    assert_success(&status);
    assert!(
        stdout(&status).contains("0 of 2 free generations used"),
        "{}",
        stdout(&status)
    );
}

#[test]
fn exhausted_free_tier_is_refused() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let data = tmp.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("usage_stats.json"), r#"{"notes": 2, "questions": 1}"#).unwrap();

    let output = run(tmp.path(), &["notes", "generate", "--text", "outline"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("You've reached your free limit of 2 study notes"),
        "{}",
        stderr(&output)
    );
}

#[test]
fn notes_export_writes_text_file() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    assert_success(&run(tmp.path(), &["notes", "generate", "--demo"]));

    let output = run(tmp.path(), &["notes", "export", "-o", "thermo.txt"]);
    assert_success(&output);
    let text = std::fs::read_to_string(tmp.path().join("thermo.txt")).unwrap();
    assert!(text.starts_with("Topic: Introduction to Thermodynamics"));
    assert!(text.contains("Important Formulas:"));
}

#[test]
fn redeem_invalid_code_fails() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["redeem", "ABCD-EFGH-JKLM"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid access code"));
}

#[test]
fn issued_code_activates_subscription_once() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let issued = run(
        tmp.path(),
        &["issue-code", "--email", "ada@example.com", "--plan", "pro"],
    );
    assert_success(&issued);
    let out = stdout(&issued);
    let code = out.lines().next().expect("code line").trim().to_string();
    assert_eq!(code.len(), 14);

    let redeemed = run(tmp.path(), &["redeem", &code.to_lowercase()]);
    assert_success(&redeemed);
    assert!(stdout(&redeemed).contains("pro plan active until"));

    let status = run(tmp.path(), &["status"]);
    assert!(stdout(&status).contains("Plan:       pro"));

    let again = run(tmp.path(), &["redeem", &code]);
    assert!(!again.status.success());
    assert!(stderr(&again).contains("already been used"));
}

#[test]
fn quiz_reads_answers_from_stdin() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    assert_success(&run(tmp.path(), &["questions", "--demo"]));

    let mut child = bin(tmp.path())
        .arg("quiz")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary not found - run cargo build first");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"b\nd\nd\na\nb\nn\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("Quiz Completed!"), "{}", out);
    assert!(out.contains("You scored 4 out of 5"), "{}", out);
}

#[test]
fn quiz_without_questions_fails() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["quiz"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no stored questions"));
}

#[test]
fn reset_clears_generated_records() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    assert_success(&run(tmp.path(), &["questions", "--demo"]));
    assert_success(&run(tmp.path(), &["reset"]));
    assert!(!tmp.path().join("data").join("questions.json").exists());
}
