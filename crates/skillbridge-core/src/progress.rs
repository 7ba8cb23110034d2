//! Per-topic progress aggregation for the "My Courses" view.
//!
//! Recomputed from the topic lesson lists and the completed set on every
//! call. Topics without progress are left out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Lesson, Topic};

/// Progress through one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub topic_id: String,
    pub topic_name: String,
    pub total_lessons: usize,
    pub completed_count: usize,
    /// `completed_count / total_lessons`, in `[0, 1]`.
    pub percent: f64,
    /// Where to resume; `None` once the topic is finished.
    pub next_lesson_id: Option<String>,
}

impl TopicProgress {
    pub fn is_finished(&self) -> bool {
        self.completed_count == self.total_lessons
    }
}

/// The lowest-order lesson not yet completed. Ties keep list order.
pub fn resume_target<'a>(lessons: &'a [Lesson], completed: &BTreeSet<String>) -> Option<&'a Lesson> {
    lessons
        .iter()
        .enumerate()
        .filter(|(_, l)| !completed.contains(&l.id))
        .min_by_key(|(position, l)| (l.order, *position))
        .map(|(_, l)| l)
}

/// Progress for one topic, or `None` when the topic has no lessons or none of
/// them are completed.
pub fn topic_progress(
    topic: &Topic,
    lessons: &[Lesson],
    completed: &BTreeSet<String>,
) -> Option<TopicProgress> {
    if lessons.is_empty() {
        return None;
    }
    let completed_count = lessons
        .iter()
        .filter(|l| completed.contains(&l.id))
        .count();
    if completed_count == 0 {
        return None;
    }

    Some(TopicProgress {
        topic_id: topic.id.clone(),
        topic_name: topic.name.clone(),
        total_lessons: lessons.len(),
        completed_count,
        percent: completed_count as f64 / lessons.len() as f64,
        next_lesson_id: resume_target(lessons, completed).map(|l| l.id.clone()),
    })
}

/// Progress for every topic that has some, in topic order.
pub fn my_courses(
    entries: &[(Topic, Vec<Lesson>)],
    completed: &BTreeSet<String>,
) -> Vec<TopicProgress> {
    entries
        .iter()
        .filter_map(|(topic, lessons)| topic_progress(topic, lessons, completed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn topic(id: &str) -> Topic {
        Topic {
            id: id.into(),
            name: id.to_uppercase(),
            description: String::new(),
        }
    }

    fn lesson(id: &str, order: u32) -> Lesson {
        Lesson {
            id: id.into(),
            title: id.into(),
            xp: 10,
            difficulty: Difficulty::Easy,
            order,
            topic_id: None,
            content: vec![],
            assessment: None,
        }
    }

    fn done(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn untouched_topics_are_hidden() {
        let lessons = vec![lesson("a", 1), lesson("b", 2)];
        assert!(topic_progress(&topic("t"), &lessons, &done(&[])).is_none());
        assert!(topic_progress(&topic("t"), &[], &done(&["a"])).is_none());
    }

    #[test]
    fn ratio_and_resume_target() {
        let lessons = vec![lesson("a", 1), lesson("b", 2), lesson("c", 3), lesson("d", 4)];
        let progress = topic_progress(&topic("t"), &lessons, &done(&["a", "c"])).unwrap();
        assert_eq!(progress.total_lessons, 4);
        assert_eq!(progress.completed_count, 2);
        assert!((progress.percent - 0.5).abs() < 1e-9);
        assert_eq!(progress.next_lesson_id.as_deref(), Some("b"));
        assert!(!progress.is_finished());
    }

    #[test]
    fn finished_topic_has_full_ratio_and_no_target() {
        let lessons = vec![lesson("a", 1), lesson("b", 2)];
        let progress = topic_progress(&topic("t"), &lessons, &done(&["a", "b"])).unwrap();
        assert_eq!(progress.percent, 1.0);
        assert!(progress.is_finished());
        assert!(progress.next_lesson_id.is_none());
    }

    #[test]
    fn resume_target_uses_order_not_list_position() {
        // Listed out of order; completion happened in a different order too.
        let lessons = vec![lesson("late", 9), lesson("early", 1), lesson("mid", 5)];
        let target = resume_target(&lessons, &done(&["late"])).unwrap();
        assert_eq!(target.id, "early");
        let target = resume_target(&lessons, &done(&["early"])).unwrap();
        assert_eq!(target.id, "mid");
    }

    #[test]
    fn equal_order_keeps_list_position() {
        let lessons = vec![lesson("x", 1), lesson("y", 1)];
        assert_eq!(resume_target(&lessons, &done(&[])).unwrap().id, "x");
    }

    #[test]
    fn completions_elsewhere_do_not_count() {
        let lessons = vec![lesson("a", 1)];
        assert!(topic_progress(&topic("t"), &lessons, &done(&["zzz"])).is_none());
    }

    #[test]
    fn my_courses_keeps_topic_order() {
        let entries = vec![
            (topic("one"), vec![lesson("1a", 1), lesson("1b", 2)]),
            (topic("two"), vec![lesson("2a", 1)]),
            (topic("three"), vec![lesson("3a", 1), lesson("3b", 2)]),
        ];
        let courses = my_courses(&entries, &done(&["1a", "3a", "3b"]));
        let ids: Vec<&str> = courses.iter().map(|c| c.topic_id.as_str()).collect();
        assert_eq!(ids, vec!["one", "three"]);
        for course in &courses {
            assert!((0.0..=1.0).contains(&course.percent));
        }
    }
}
