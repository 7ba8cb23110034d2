//! Streak, XP and interest bookkeeping on the learner profile.
//!
//! The backend owns the stored profile; these rules let the client (and the
//! in-memory backend) apply an assessment result without refetching.

use chrono::{DateTime, NaiveDate};

use crate::error::LearningError;
use crate::model::{AssessmentResponse, UserProfile};

/// Streak after activity on `today`.
///
/// Activity on the same day keeps the streak, activity on the following day
/// extends it, and anything else starts over at 1.
pub fn advance_streak(last_activity: Option<NaiveDate>, current: u32, today: NaiveDate) -> u32 {
    match last_activity {
        Some(last) if last == today => current.max(1),
        Some(last) if last.succ_opt() == Some(today) => current.saturating_add(1),
        _ => 1,
    }
}

/// Parse a stored activity date, accepting plain dates and RFC 3339 timestamps.
pub fn parse_activity_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

impl UserProfile {
    pub fn has_completed(&self, lesson_id: &str) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    pub fn last_activity_day(&self) -> Option<NaiveDate> {
        self.last_activity_date
            .as_deref()
            .and_then(parse_activity_date)
    }

    /// Apply a submission result.
    ///
    /// Returns the XP actually granted. Repeat passes of the same lesson do not
    /// grant XP again. A failed attempt leaves the profile untouched.
    pub fn apply_assessment(
        &mut self,
        lesson_id: &str,
        response: &AssessmentResponse,
        today: NaiveDate,
    ) -> u32 {
        if !response.passed() {
            return 0;
        }

        let first_completion = self.completed_lessons.insert(lesson_id.to_string());
        let granted = if first_completion {
            response.xp_earned
        } else {
            0
        };
        self.total_xp += u64::from(granted);
        self.current_streak = advance_streak(self.last_activity_day(), self.current_streak, today);
        self.last_activity_date = Some(today.format("%Y-%m-%d").to_string());
        granted
    }
}

/// Trim, lowercase and dedupe an interest selection, keeping first-seen order.
pub fn normalize_interests<I, S>(selection: I) -> Result<Vec<String>, LearningError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut interests: Vec<String> = Vec::new();
    for raw in selection {
        let interest = raw.as_ref().trim().to_lowercase();
        if !interest.is_empty() && !interests.contains(&interest) {
            interests.push(interest);
        }
    }
    if interests.is_empty() {
        return Err(LearningError::NoInterestsSelected);
    }
    Ok(interests)
}
