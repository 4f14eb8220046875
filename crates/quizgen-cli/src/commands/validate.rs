//! The `quizgen validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizgen_core::catalog::{load_catalog, validate_catalog};

pub fn execute(catalog_path: PathBuf) -> Result<()> {
    let catalog = load_catalog(&catalog_path)?;

    let sub_topics: usize = catalog.subjects.iter().map(|s| s.sub_topics.len()).sum();
    println!(
        "Catalog: {} ({} subjects, {} sub-topics)",
        catalog_path.display(),
        catalog.subjects.len(),
        sub_topics
    );

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .subject
            .as_ref()
            .map(|name| format!("  [{name}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Catalog valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
