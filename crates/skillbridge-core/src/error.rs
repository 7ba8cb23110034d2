//! Domain error types.
//!
//! These errors come from the local rules (unlocking, submission checks,
//! request transitions) and are raised before anything is sent to the backend.

use thiserror::Error;

use crate::mentorship::RequestStatus;
use crate::model::Difficulty;

/// Errors raised by the progression and assessment rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LearningError {
    /// The lesson's difficulty tier is still gated by an incomplete tier.
    #[error("lesson {lesson_id} is locked: complete every {blocking} lesson first")]
    LessonLocked {
        lesson_id: String,
        blocking: Difficulty,
    },

    /// The lesson is not part of the topic being browsed.
    #[error("lesson not found: {0}")]
    LessonNotFound(String),

    /// The lesson document has no assessment to submit against.
    #[error("lesson {0} has no assessment")]
    MissingAssessment(String),

    /// Not every question has an answer.
    #[error("answer all questions before submitting ({answered}/{total} answered)")]
    IncompleteSubmission { answered: usize, total: usize },

    /// An answer references a question that is not in the assessment.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// An answer picks an option the question does not offer.
    #[error("option {option_id} is not offered by question {question_id}")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },

    /// The answer sheet was already submitted.
    #[error("answers cannot change after submission")]
    AlreadySubmitted,

    /// A mentorship request can only leave the pending state once.
    #[error("cannot move a {from} request to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    /// Interest selection was empty after normalization.
    #[error("select at least one interest")]
    NoInterestsSelected,

    /// A required form field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The backend has no credentials to act on the learner's behalf.
    #[error("not signed in: set a token in skillbridge.toml or SKILLBRIDGE_TOKEN")]
    NotSignedIn,
}

impl LearningError {
    /// Returns `true` if the error is caused by the learner's input and can be
    /// fixed by changing it (as opposed to a content or state problem).
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            LearningError::IncompleteSubmission { .. }
                | LearningError::UnknownOption { .. }
                | LearningError::NoInterestsSelected
                | LearningError::MissingField(_)
        )
    }
}
