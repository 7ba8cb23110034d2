//! Topic discussion boards and mentorship chat.

use serde::{Deserialize, Serialize};

use crate::error::LearningError;
use crate::model::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_name: String,
    /// Backend timestamp, passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<serde_json::Value>,
    #[serde(default)]
    pub reply_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_name: String,
}

/// A post with its replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    #[serde(default, deserialize_with = "null_as_default")]
    pub replies: Vec<Reply>,
}

/// Body of `POST /community`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub topic_id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

impl NewPost {
    pub fn new(
        topic_id: &str,
        title: &str,
        content: &str,
        author_name: Option<String>,
    ) -> Result<Self, LearningError> {
        if title.trim().is_empty() {
            return Err(LearningError::MissingField("title"));
        }
        if content.trim().is_empty() {
            return Err(LearningError::MissingField("content"));
        }
        Ok(Self {
            topic_id: topic_id.to_string(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            author_name,
        })
    }
}

/// Body of `POST /community/post/{id}/reply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReply {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

impl NewReply {
    pub fn new(content: &str, author_name: Option<String>) -> Result<Self, LearningError> {
        if content.trim().is_empty() {
            return Err(LearningError::MissingField("content"));
        }
        Ok(Self {
            content: content.trim().to_string(),
            author_name,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUser {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One message in a mentorship chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user: ChatUser,
}

impl ChatMessage {
    pub fn sender(&self) -> &str {
        self.user.name.as_deref().unwrap_or(&self.user.id)
    }
}

/// Validate an outgoing chat message.
pub fn chat_text(text: &str) -> Result<&str, LearningError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LearningError::MissingField("text"));
    }
    Ok(text)
}
