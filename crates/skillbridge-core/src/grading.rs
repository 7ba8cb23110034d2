//! Micro-lesson quiz grading.
//!
//! Quizzes are graded remotely by the `gradeQuiz` callable. When that call is
//! unavailable, [`grade_locally`] produces a simulated grade which is flagged
//! as non-authoritative.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// XP a question is worth when it does not say otherwise.
pub const DEFAULT_QUESTION_XP: u32 = 10;

/// A micro-lesson quiz with index-based answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroQuiz {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub questions: Vec<MicroQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroQuestion {
    pub id: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub answer_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<u32>,
}

impl MicroQuestion {
    pub fn xp_value(&self) -> u32 {
        self.xp.unwrap_or(DEFAULT_QUESTION_XP)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: String,
    pub selected_index: usize,
}

/// Payload sent to the `gradeQuiz` callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizPayload {
    pub quiz: MicroQuiz,
    #[serde(default)]
    pub answers: Vec<QuizAnswer>,
}

/// XP earned out of XP available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizGrade {
    pub earned: u64,
    pub total: u64,
}

impl QuizGrade {
    pub fn is_perfect(&self) -> bool {
        self.earned == self.total
    }
}

/// A grade plus where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeOutcome {
    pub grade: QuizGrade,
    /// `true` when the grade was computed locally because the remote grader
    /// could not be reached.
    pub simulated: bool,
}

/// Grade a quiz on the device.
///
/// Only the first answer for a question counts and answers for unknown
/// questions are ignored, so `earned <= total` always holds.
pub fn grade_locally(payload: &QuizPayload) -> QuizGrade {
    let total = payload
        .quiz
        .questions
        .iter()
        .map(|q| u64::from(q.xp_value()))
        .sum();

    let mut seen = HashSet::new();
    let earned = payload
        .answers
        .iter()
        .filter(|a| seen.insert(a.question_id.as_str()))
        .filter_map(|a| {
            payload
                .quiz
                .questions
                .iter()
                .find(|q| q.id == a.question_id)
                .filter(|q| q.answer_index == a.selected_index)
                .map(|q| u64::from(q.xp_value()))
        })
        .sum();

    QuizGrade { earned, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> MicroQuiz {
        MicroQuiz {
            id: Some("daily".into()),
            questions: vec![
                MicroQuestion {
                    id: "q1".into(),
                    question_text: "2 + 2".into(),
                    options: vec!["3".into(), "4".into()],
                    answer_index: 1,
                    xp: None,
                },
                MicroQuestion {
                    id: "q2".into(),
                    question_text: "Capital of France".into(),
                    options: vec!["Paris".into(), "Rome".into()],
                    answer_index: 0,
                    xp: Some(25),
                },
            ],
        }
    }

    fn answer(id: &str, index: usize) -> QuizAnswer {
        QuizAnswer {
            question_id: id.into(),
            selected_index: index,
        }
    }

    #[test]
    fn total_uses_default_xp() {
        let grade = grade_locally(&QuizPayload {
            quiz: quiz(),
            answers: vec![],
        });
        assert_eq!(grade, QuizGrade { earned: 0, total: 35 });
    }

    #[test]
    fn all_correct_is_perfect() {
        let grade = grade_locally(&QuizPayload {
            quiz: quiz(),
            answers: vec![answer("q1", 1), answer("q2", 0)],
        });
        assert_eq!(grade.earned, 35);
        assert!(grade.is_perfect());
    }

    #[test]
    fn partial_credit() {
        let grade = grade_locally(&QuizPayload {
            quiz: quiz(),
            answers: vec![answer("q1", 0), answer("q2", 0)],
        });
        assert_eq!(grade, QuizGrade { earned: 25, total: 35 });
    }

    #[test]
    fn duplicate_and_unknown_answers_cannot_inflate_earned() {
        let grade = grade_locally(&QuizPayload {
            quiz: quiz(),
            answers: vec![
                answer("q2", 0),
                answer("q2", 0),
                answer("q2", 0),
                answer("ghost", 0),
            ],
        });
        assert_eq!(grade, QuizGrade { earned: 25, total: 35 });
        assert!(grade.earned <= grade.total);
    }

    #[test]
    fn large_xp_values_do_not_overflow() {
        let mut quiz = quiz();
        for q in &mut quiz.questions {
            q.xp = Some(u32::MAX - 1);
        }
        let grade = grade_locally(&QuizPayload {
            quiz,
            answers: vec![answer("q1", 1), answer("q2", 0)],
        });
        assert_eq!(grade.total, 2 * u64::from(u32::MAX - 1));
        assert!(grade.is_perfect());
        assert!(grade.earned <= grade.total);
    }

    #[test]
    fn first_answer_wins() {
        let grade = grade_locally(&QuizPayload {
            quiz: quiz(),
            answers: vec![answer("q1", 0), answer("q1", 1)],
        });
        assert_eq!(grade.earned, 0);
    }

    #[test]
    fn payload_uses_camel_case() {
        let json = r#"{"quiz":{"questions":[{"id":"q1","answerIndex":2,"xp":5}]},
                       "answers":[{"questionId":"q1","selectedIndex":2}]}"#;
        let payload: QuizPayload = serde_json::from_str(json).unwrap();
        assert_eq!(grade_locally(&payload), QuizGrade { earned: 5, total: 5 });
    }
}
