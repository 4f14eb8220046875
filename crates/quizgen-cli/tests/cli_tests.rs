//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Runs in `dir` with `HOME` pointed at it so no user config leaks in.
fn quizgen(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizgen").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("QUIZGEN_ANTHROPIC_KEY")
        .env_remove("QUIZGEN_OPENAI_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

const CATALOG: &str = r#"
[[subjects]]
name = "Cardiology"
sub_topics = ["Arrhythmias", "Heart Failure"]

[[subjects]]
name = "Renal"
sub_topics = ["Glomerular Disease"]
"#;

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("medical study"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizgen"));
}

#[test]
fn topics_lists_builtin_catalog() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .arg("topics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cardiology"))
        .stdout(predicate::str::contains("1. Arrhythmias"));
}

#[test]
fn topics_with_custom_catalog() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("catalog.toml"), CATALOG).unwrap();

    quizgen(&dir)
        .args(["topics", "--catalog", "catalog.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2. Renal"))
        .stdout(predicate::str::contains("Glomerular Disease"))
        .stdout(predicate::str::contains("Anatomy").not());
}

#[test]
fn validate_valid_catalog() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("catalog.toml"), CATALOG).unwrap();

    quizgen(&dir)
        .args(["validate", "--catalog", "catalog.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 subjects, 3 sub-topics"))
        .stdout(predicate::str::contains("Catalog valid."));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("catalog.toml"),
        r#"
[[subjects]]
name = "Cardiology"
sub_topics = ["Arrhythmias"]

[[subjects]]
name = "Cardiology"
sub_topics = []
"#,
    )
    .unwrap();

    quizgen(&dir)
        .args(["validate", "--catalog", "catalog.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Cardiology] WARNING: duplicate subject"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .args(["validate", "--catalog", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizgen(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizgen.toml"))
        .stdout(predicate::str::contains("Created catalog.toml"));

    assert!(dir.path().join("quizgen.toml").exists());
    assert!(dir.path().join("catalog.toml").exists());

    quizgen(&dir)
        .args(["validate", "--catalog", "catalog.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog valid."));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizgen(&dir).arg("init").assert().success();

    quizgen(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn list_models_from_generated_config() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir).arg("init").assert().success();

    quizgen(&dir)
        .args(["list-models", "--provider", "anthropic"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: anthropic (default)"))
        .stdout(predicate::str::contains("claude-sonnet-4"))
        .stdout(predicate::str::contains("gpt-4.1").not());
}

#[test]
fn list_models_without_config() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("No providers configured"));
}

#[test]
fn env_key_configures_provider() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .env("QUIZGEN_OPENAI_KEY", "sk-test")
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: openai"));
}

#[test]
fn play_without_provider_fails() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .arg("play")
        .assert()
        .failure()
        .stderr(predicate::str::contains("provider 'anthropic' is not configured"));
}

#[test]
fn play_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .args(["play", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn play_setup_screen_then_quit() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("catalog.toml"), CATALOG).unwrap();
    // Never contacted: the session ends on the setup screen.
    std::fs::write(
        dir.path().join("quizgen.toml"),
        r#"
default_provider = "local"

[providers.local]
type = "openai"
api_key = "unused"
base_url = "http://127.0.0.1:9"
"#,
    )
    .unwrap();

    quizgen(&dir)
        .args(["play", "--catalog", "catalog.toml"])
        .write_stdin("\n5\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("== New quiz =="))
        .stdout(predicate::str::contains(" 2. Renal"))
        .stdout(predicate::str::contains("Please select both subject and sub-topic"));
}

#[test]
fn play_sub_topic_requires_subject() {
    let dir = TempDir::new().unwrap();
    quizgen(&dir)
        .args(["play", "--sub-topic", "Arrhythmias"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--subject"));
}
