//! Assessment submission protocol.
//!
//! Answers are collected locally in an [`AnswerSheet`]. A sheet only turns into
//! a submission when every question has an answer, so an incomplete attempt
//! never reaches the backend. Pass/fail is the backend's call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::LearningError;
use crate::model::{
    Assessment, AssessmentResponse, AssessmentStatus, Lesson, RemedialLesson, SubmittedAnswer,
};

/// One selected option per question, frozen once submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    selections: BTreeMap<String, String>,
    submitted: bool,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `option_id` for `question_id`, replacing any earlier choice.
    pub fn select(
        &mut self,
        question_id: impl Into<String>,
        option_id: impl Into<String>,
    ) -> Result<(), LearningError> {
        if self.submitted {
            return Err(LearningError::AlreadySubmitted);
        }
        self.selections.insert(question_id.into(), option_id.into());
        Ok(())
    }

    pub fn selected(&self, question_id: &str) -> Option<&str> {
        self.selections.get(question_id).map(String::as_str)
    }

    pub fn answered(&self) -> usize {
        self.selections.len()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Validate against `assessment` and freeze the sheet.
    ///
    /// Answers come back in question order. The sheet stays editable when
    /// validation fails.
    pub fn submission(
        &mut self,
        assessment: &Assessment,
    ) -> Result<Vec<SubmittedAnswer>, LearningError> {
        if self.submitted {
            return Err(LearningError::AlreadySubmitted);
        }

        for (question_id, option_id) in &self.selections {
            let question = assessment
                .question(question_id)
                .ok_or_else(|| LearningError::UnknownQuestion(question_id.clone()))?;
            if !question.has_option(option_id) {
                return Err(LearningError::UnknownOption {
                    question_id: question_id.clone(),
                    option_id: option_id.clone(),
                });
            }
        }

        let answered = assessment
            .questions
            .iter()
            .filter(|q| self.selections.contains_key(&q.id))
            .count();
        let total = assessment.questions.len();
        if answered != total {
            return Err(LearningError::IncompleteSubmission { answered, total });
        }

        self.submitted = true;
        Ok(assessment
            .questions
            .iter()
            .map(|q| SubmittedAnswer {
                question_id: q.id.clone(),
                selected_option_id: self.selections[&q.id].clone(),
            })
            .collect())
    }

    /// Make a frozen sheet editable again after the submission failed to send.
    pub(crate) fn reopen(&mut self) {
        self.submitted = false;
    }
}

/// Fraction of answers that pick the correct option, in `[0, 1]`.
///
/// For display only; the backend decides whether the attempt passes.
pub fn score_answers(assessment: &Assessment, answers: &[SubmittedAnswer]) -> f64 {
    if assessment.questions.is_empty() {
        return 0.0;
    }
    let correct = assessment
        .questions
        .iter()
        .filter(|q| {
            answers
                .iter()
                .find(|a| a.question_id == q.id)
                .is_some_and(|a| q.is_correct(&a.selected_option_id))
        })
        .count();
    correct as f64 / assessment.questions.len() as f64
}

/// What the learner can do after a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    /// Passed; continue with the next lesson in the topic.
    Advance { next_lesson_id: String },
    /// Passed the last lesson of the topic.
    TopicFinished,
    /// Not passed; review material is available.
    Review(RemedialLesson),
    /// Not passed and no review material was provided.
    Retry,
}

pub fn next_step(response: &AssessmentResponse) -> NextStep {
    match (response.status, &response.next_lesson_id, &response.remedial_lesson) {
        (AssessmentStatus::Passed, Some(next), _) => NextStep::Advance {
            next_lesson_id: next.clone(),
        },
        (AssessmentStatus::Passed, None, _) => NextStep::TopicFinished,
        (AssessmentStatus::RequiresReview, _, Some(remedial)) => NextStep::Review(remedial.clone()),
        (AssessmentStatus::RequiresReview, _, None) => NextStep::Retry,
    }
}

impl RemedialLesson {
    /// Present the review material as a lesson for display.
    ///
    /// The result has no assessment, so it never counts toward progression.
    pub fn into_lesson(self, origin: &Lesson) -> Lesson {
        Lesson {
            id: format!("{}-review", origin.id),
            title: self.title,
            xp: 0,
            difficulty: self.difficulty.parse().unwrap_or(origin.difficulty),
            order: origin.order,
            topic_id: origin.topic_id.clone(),
            content: self.content,
            assessment: None,
        }
    }
}
