//! Topic recommendation and search.

use serde::Serialize;

use crate::model::Topic;

pub const RECOMMENDED_TITLE: &str = "Recommended For You";
pub const ALL_TOPICS_TITLE: &str = "All Topics";

/// The home screen's topic list and its heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeFeed {
    pub title: &'static str,
    pub topics: Vec<Topic>,
    /// Whether `topics` is the interest-filtered list.
    pub personalized: bool,
}

/// Whether any interest appears in the topic name, ignoring case.
pub fn is_interested(topic: &Topic, interests: &[String]) -> bool {
    let name = topic.name.to_lowercase();
    interests
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .any(|i| name.contains(&i))
}

/// Topics matching at least one interest, in catalog order.
pub fn recommended_topics(topics: &[Topic], interests: &[String]) -> Vec<Topic> {
    topics
        .iter()
        .filter(|t| is_interested(t, interests))
        .cloned()
        .collect()
}

/// Recommended topics when there are any, otherwise everything.
pub fn home_feed(topics: &[Topic], interests: &[String]) -> HomeFeed {
    let recommended = recommended_topics(topics, interests);
    if recommended.is_empty() {
        HomeFeed {
            title: ALL_TOPICS_TITLE,
            topics: topics.to_vec(),
            personalized: false,
        }
    } else {
        HomeFeed {
            title: RECOMMENDED_TITLE,
            topics: recommended,
            personalized: true,
        }
    }
}

/// Case-insensitive search over name and description.
pub fn search_topics(topics: &[Topic], query: &str) -> Vec<Topic> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return topics.to_vec();
    }
    topics
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&query)
                || t.description.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// A topic as listed on the browse screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicView {
    #[serde(flatten)]
    pub topic: Topic,
    pub for_you: bool,
}

pub fn topic_views(topics: &[Topic], interests: &[String]) -> Vec<TopicView> {
    topics
        .iter()
        .map(|t| TopicView {
            topic: t.clone(),
            for_you: is_interested(t, interests),
        })
        .collect()
}
