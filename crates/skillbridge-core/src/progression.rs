//! Difficulty-gated unlocking and mentor graduation.
//!
//! A topic's lessons are partitioned into easy, medium and hard tiers. A tier
//! unlocks only when every lesson of each lower tier is completed. Nothing is
//! cached: every call re-scans the topic's lesson list.

use std::collections::BTreeSet;

use crate::error::LearningError;
use crate::model::{Difficulty, Lesson};

/// A lesson together with its derived lock/completion flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LessonState<'a> {
    pub lesson: &'a Lesson,
    pub locked: bool,
    pub completed: bool,
}

/// Whether every lesson of `tier` in `lessons` is completed.
///
/// An empty tier is vacuously complete.
pub fn tier_complete(lessons: &[Lesson], completed: &BTreeSet<String>, tier: Difficulty) -> bool {
    lessons
        .iter()
        .filter(|l| l.difficulty == tier)
        .all(|l| completed.contains(&l.id))
}

/// The lowest prerequisite tier of `difficulty` that is not yet complete.
pub fn blocking_tier(
    difficulty: Difficulty,
    lessons: &[Lesson],
    completed: &BTreeSet<String>,
) -> Option<Difficulty> {
    difficulty
        .prerequisites()
        .iter()
        .copied()
        .find(|&tier| !tier_complete(lessons, completed, tier))
}

/// Whether lessons of `difficulty` are reachable in this topic.
pub fn is_unlocked(
    difficulty: Difficulty,
    lessons: &[Lesson],
    completed: &BTreeSet<String>,
) -> bool {
    blocking_tier(difficulty, lessons, completed).is_none()
}

/// Lock and completion state for every lesson, in list order.
pub fn lesson_states<'a>(
    lessons: &'a [Lesson],
    completed: &BTreeSet<String>,
) -> Vec<LessonState<'a>> {
    lessons
        .iter()
        .map(|lesson| LessonState {
            lesson,
            locked: !is_unlocked(lesson.difficulty, lessons, completed),
            completed: completed.contains(&lesson.id),
        })
        .collect()
}

/// Reject opening a lesson whose tier is still gated.
pub fn check_access(
    lesson: &Lesson,
    lessons: &[Lesson],
    completed: &BTreeSet<String>,
) -> Result<(), LearningError> {
    match blocking_tier(lesson.difficulty, lessons, completed) {
        Some(blocking) => Err(LearningError::LessonLocked {
            lesson_id: lesson.id.clone(),
            blocking,
        }),
        None => Ok(()),
    }
}

/// Mentor eligibility: the topic has hard lessons and all of them are done.
pub fn can_graduate(lessons: &[Lesson], completed: &BTreeSet<String>) -> bool {
    let mut hard = lessons
        .iter()
        .filter(|l| l.difficulty == Difficulty::Hard)
        .peekable();
    hard.peek().is_some() && hard.all(|l| completed.contains(&l.id))
}
