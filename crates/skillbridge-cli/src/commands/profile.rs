//! Learner profile and interests.

use anyhow::Result;

use super::Context;

pub async fn show(ctx: &Context) -> Result<()> {
    let (service, _) = ctx.service()?;
    let profile = service.profile().await?;

    println!("{}", profile.name.as_deref().unwrap_or(&profile.user_id));
    println!("  XP:        {}", profile.total_xp);
    println!(
        "  Streak:    {} day{}",
        profile.current_streak,
        if profile.current_streak == 1 { "" } else { "s" }
    );
    println!("  Completed: {} lessons", profile.completed_lessons.len());
    if let Some(day) = profile.last_activity_day() {
        println!("  Last seen: {}", day.format("%Y-%m-%d"));
    }
    if !profile.interests.is_empty() {
        println!("  Interests: {}", profile.interests.join(", "));
    }
    if profile.is_mentor {
        println!("  Mentor");
    }
    Ok(())
}

pub async fn interests(ctx: &Context, selection: Vec<String>) -> Result<()> {
    let (service, _) = ctx.service()?;
    let saved = service.update_interests(&selection).await?;
    println!("Interests saved: {}", saved.join(", "));
    Ok(())
}
