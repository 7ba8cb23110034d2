//! The `skillbridge init` command.

use std::path::Path;

use anyhow::{Context as _, Result};

use skillbridge_client::config::CONFIG_TEMPLATE;

pub fn execute() -> Result<()> {
    write_once(Path::new("skillbridge.toml"), CONFIG_TEMPLATE)?;

    std::fs::create_dir_all("catalogs").context("failed to create catalogs/")?;
    write_once(Path::new("catalogs/example.toml"), EXAMPLE_CATALOG)?;

    println!("\nNext steps:");
    println!("  1. Put your ID token in SKILLBRIDGE_TOKEN (or skillbridge.toml)");
    println!("  2. Run: skillbridge validate catalogs/example.toml");
    println!("  3. Try offline: skillbridge --catalog catalogs lessons basics");
    Ok(())
}

fn write_once(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const EXAMPLE_CATALOG: &str = r#"[[topics]]
id = "basics"
name = "Study Basics"
description = "How to learn effectively"

[[lessons]]
id = "basics-1"
topic = "basics"
title = "Spaced Repetition"
xp = 10
difficulty = "easy"
order = 1

[[lessons.content]]
type = "paragraph"
text = "Reviewing material at growing intervals beats cramming."

[lessons.assessment]
passing_score = 0.7

[[lessons.assessment.questions]]
id = "basics-1-q1"
question = "What beats cramming?"
options = [{ id = "a", text = "Spaced review" }, { id = "b", text = "All-nighters" }]
correct = "a"

[[lessons]]
id = "basics-2"
topic = "basics"
title = "Teaching to Learn"
xp = 20
difficulty = "hard"
order = 2

[[lessons.content]]
type = "paragraph"
text = "Explaining a topic to someone else exposes the gaps in your understanding."

[lessons.assessment]
passing_score = 1.0

[[lessons.assessment.questions]]
id = "basics-2-q1"
question = "What does teaching expose?"
options = [{ id = "a", text = "Gaps" }, { id = "b", text = "Nothing" }]
correct = "a"
"#;
