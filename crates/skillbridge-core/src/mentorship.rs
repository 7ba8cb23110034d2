//! Mentor applications, mentorship requests and mentor-uploaded resources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LearningError;
use crate::model::null_as_default;

/// Lifecycle of a mentorship request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    /// Move to `to`. Only a pending request can be decided, and only once.
    pub fn transition(self, to: RequestStatus) -> Result<RequestStatus, LearningError> {
        match (self, to) {
            (RequestStatus::Pending, RequestStatus::Accepted | RequestStatus::Rejected) => Ok(to),
            (from, to) => Err(LearningError::InvalidTransition { from, to }),
        }
    }

    pub fn is_open(self) -> bool {
        self == RequestStatus::Pending
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Accepted => write!(f, "accepted"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" | "accept" => Ok(RequestStatus::Accepted),
            "rejected" | "reject" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// A mentorship request as seen by the mentor or the student.
///
/// The dashboard fills `student_name`; the sent-requests list fills
/// `mentor_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub status: RequestStatus,
}

/// A mentor available for a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
    pub uid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(default)]
    pub rating: f64,
}

/// How a mentor qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationMethod {
    /// Finished every hard lesson of the topic.
    Grind,
    /// Self-declared expertise.
    Certificate,
}

/// Body of `POST /mentorship/apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorApplication {
    pub bio: String,
    pub topics: Vec<String>,
    pub method: ApplicationMethod,
}

impl MentorApplication {
    /// Application for a learner who graduated from `topic_id`.
    pub fn graduate(topic_id: &str, topic_name: &str) -> Self {
        Self {
            bio: format!(
                "I have mastered {topic_name} on SkillBridge and would like to help others."
            ),
            topics: vec![topic_id.to_string()],
            method: ApplicationMethod::Grind,
        }
    }

    /// Application with a free-form bio and comma-separated topic ids.
    pub fn manual(bio: &str, topics_csv: &str) -> Result<Self, LearningError> {
        let bio = bio.trim();
        if bio.is_empty() {
            return Err(LearningError::MissingField("bio"));
        }
        let topics: Vec<String> = topics_csv
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if topics.is_empty() {
            return Err(LearningError::MissingField("topics"));
        }
        Ok(Self {
            bio: bio.to_string(),
            topics,
            method: ApplicationMethod::Certificate,
        })
    }

    pub fn with_bio(mut self, bio: &str) -> Self {
        if !bio.trim().is_empty() {
            self.bio = bio.trim().to_string();
        }
        self
    }
}

/// Body of `POST /mentorship/request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipRequestDraft {
    pub mentor_id: String,
    pub topic_id: String,
    pub topic_name: String,
    pub message: String,
}

/// Kind of uploaded class material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Video,
    Pdf,
    Article,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Video => write!(f, "video"),
            ResourceKind::Pdf => write!(f, "pdf"),
            ResourceKind::Article => write!(f, "article"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(ResourceKind::Video),
            "pdf" => Ok(ResourceKind::Pdf),
            "article" | "link" => Ok(ResourceKind::Article),
            other => Err(format!("unknown resource type: {other}")),
        }
    }
}

/// Mentor-contributed material attached to a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mentor_name: String,
}

/// Body of `POST /content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUpload {
    pub title: String,
    pub url: String,
    pub topic_id: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

impl ResourceUpload {
    pub fn new(title: &str, url: &str, topic_id: &str) -> Result<Self, LearningError> {
        let (title, url, topic_id) = (title.trim(), url.trim(), topic_id.trim());
        if title.is_empty() {
            return Err(LearningError::MissingField("title"));
        }
        if url.is_empty() {
            return Err(LearningError::MissingField("url"));
        }
        if topic_id.is_empty() {
            return Err(LearningError::MissingField("topic"));
        }
        Ok(Self {
            title: title.to_string(),
            url: url.to_string(),
            topic_id: topic_id.to_lowercase(),
            kind: ResourceKind::default(),
        })
    }

    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = kind;
        self
    }
}
