//! The `quizgen init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_unless_exists(Path::new("quizgen.toml"), SAMPLE_CONFIG)?;
    write_unless_exists(Path::new("catalog.toml"), EXAMPLE_CATALOG)?;

    println!("\nNext steps:");
    println!("  1. Export ANTHROPIC_API_KEY (or edit quizgen.toml)");
    println!("  2. Run: quizgen validate --catalog catalog.toml");
    println!("  3. Run: quizgen play --catalog catalog.toml");

    Ok(())
}

fn write_unless_exists(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizgen configuration

default_provider = "anthropic"
default_model = "claude-sonnet-4-20250514"
temperature = 0.7
max_tokens = 1024
max_retries = 2
retry_delay_ms = 1000

# 0 means untimed / unlimited
time_limit_secs = 0
question_limit = 10

# catalog = "catalog.toml"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;

const EXAMPLE_CATALOG: &str = r#"# Subjects and sub-topics offered on the setup screen, in order.

[[subjects]]
name = "Cardiology"
sub_topics = ["Arrhythmias", "Heart Failure", "Ischemic Heart Disease", "Valvular Disease"]

[[subjects]]
name = "Pharmacology"
sub_topics = ["Autonomic Drugs", "Antimicrobials", "Cardiovascular Drugs"]
"#;
