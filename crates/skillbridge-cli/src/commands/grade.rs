//! The `skillbridge grade` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use skillbridge_core::grading::QuizPayload;

use super::Context;

pub async fn execute(ctx: &Context, file: PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read quiz: {}", file.display()))?;
    let payload: QuizPayload = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse quiz: {}", file.display()))?;

    let (service, _) = ctx.service()?;
    let outcome = service.grade_quiz(&payload).await;

    println!(
        "Earned {}/{} XP{}",
        outcome.grade.earned,
        outcome.grade.total,
        if outcome.simulated {
            " (graded locally)"
        } else {
            ""
        }
    );
    if outcome.grade.total > 0 && outcome.grade.is_perfect() {
        println!("Perfect score!");
    }
    Ok(())
}
