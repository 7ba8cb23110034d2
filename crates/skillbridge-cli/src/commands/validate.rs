//! The `skillbridge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use skillbridge_core::catalog::{load_catalog, validate_catalog};

pub fn execute(path: PathBuf) -> Result<()> {
    let catalog = load_catalog(&path)?;

    for topic in &catalog.topics {
        println!(
            "Topic: {} ({} lessons)",
            topic.name,
            catalog.lessons_for(&topic.id).len()
        );
    }

    let warnings = validate_catalog(&catalog);
    for w in &warnings {
        let prefix = w
            .subject
            .as_ref()
            .map(|id| format!("  [{id}]"))
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
