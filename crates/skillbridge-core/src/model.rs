//! Core data model types for SkillBridge.
//!
//! These mirror the JSON documents served by the SkillBridge REST API
//! (camelCase field names) and are shared by every other module.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A subject area grouping lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique identifier (e.g. "finance").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description shown in topic listings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Difficulty tier of a lesson. Tiers gate each other in order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers, lowest first.
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// Tiers that must be fully completed before this tier unlocks.
    pub fn prerequisites(self) -> &'static [Difficulty] {
        match self {
            Difficulty::Easy => &[],
            Difficulty::Medium => &[Difficulty::Easy],
            Difficulty::Hard => &[Difficulty::Easy, Difficulty::Medium],
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A unit of instructional content with an embedded assessment.
///
/// Topic listings return lessons without `content` or `assessment`; the full
/// document is fetched by id when the lesson is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// XP awarded on completion.
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Ordering key within the topic.
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
}

impl Lesson {
    /// Whether this document carries everything needed to play the lesson.
    pub fn is_playable(&self) -> bool {
        !self.content.is_empty() && self.assessment.is_some()
    }
}

/// One block of lesson content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Paragraph {
        #[serde(default)]
        text: String,
    },
    Image {
        #[serde(default)]
        url: String,
    },
    Quiz(QuizBlock),
}

/// An inline practice question embedded in lesson content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBlock {
    #[serde(default)]
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_type: Option<String>,
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// The graded assessment that closes a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Fraction of correct answers required to pass, in `[0, 1]`.
    pub passing_score: f64,
    #[serde(default)]
    pub questions: Vec<AssessmentQuestion>,
}

impl Assessment {
    pub fn question(&self, id: &str) -> Option<&AssessmentQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// A multiple-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(default)]
    pub quiz_type: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer_id: String,
}

impl AssessmentQuestion {
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }

    pub fn is_correct(&self, option_id: &str) -> bool {
        self.correct_answer_id == option_id
    }
}

/// One learner's profile as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_xp: u64,
    /// Completed lesson ids. Order carries no meaning.
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed_lessons: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_streak: u32,
    /// Date of the last recorded activity (ISO-8601 date or timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_mentor: bool,
}

/// Backend verdict on an assessment submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Passed,
    RequiresReview,
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentStatus::Passed => write!(f, "passed"),
            AssessmentStatus::RequiresReview => write!(f, "requires_review"),
        }
    }
}

/// Result of a submitted assessment. The backend's status is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub status: AssessmentStatus,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub xp_earned: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_lesson_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remedial_lesson: Option<RemedialLesson>,
}

impl AssessmentResponse {
    pub fn passed(&self) -> bool {
        self.status == AssessmentStatus::Passed
    }
}

/// Review material returned when an assessment is not passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemedialLesson {
    pub title: String,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// One answer in an assessment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub selected_option_id: String,
}

/// Result of the `generatePersonalizedContent` callable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedContent {
    #[serde(default)]
    pub created: bool,
}

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
