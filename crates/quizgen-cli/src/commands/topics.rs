//! The `quizgen topics` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use quizgen_core::catalog::{load_catalog, Catalog};

use crate::view::catalog_listing;

pub fn execute(catalog_path: Option<PathBuf>) -> Result<()> {
    let catalog = resolve_catalog(catalog_path.as_deref())?;
    print!("{}", catalog_listing(&catalog));
    Ok(())
}

/// The catalog at `path`, or the built-in one.
pub fn resolve_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => load_catalog(path),
        None => Ok(Catalog::builtin()),
    }
}
