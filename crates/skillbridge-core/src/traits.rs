//! The backend seam.
//!
//! [`LearningBackend`] is implemented by the HTTP client and by the in-memory
//! backend in `skillbridge-client`.

use async_trait::async_trait;

use crate::community::{ChatMessage, NewPost, NewReply, Post, PostDetail};
use crate::grading::{QuizGrade, QuizPayload};
use crate::mentorship::{
    Mentor, MentorApplication, MentorshipRequest, MentorshipRequestDraft, RequestStatus,
    Resource, ResourceUpload,
};
use crate::model::{
    AssessmentResponse, Lesson, PersonalizedContent, SubmittedAnswer, Topic, UserProfile,
};

/// Remote operations the client relies on. One method per endpoint.
#[async_trait]
pub trait LearningBackend: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Whether requests can be authorized. Backends without credentials
    /// reject every call before building a request.
    fn is_authenticated(&self) -> bool {
        true
    }

    // -- Catalog --

    async fn topics(&self) -> anyhow::Result<Vec<Topic>>;

    /// Lesson summaries for a topic (no content or assessment).
    async fn lessons(&self, topic_id: &str) -> anyhow::Result<Vec<Lesson>>;

    /// The full lesson document.
    async fn lesson(&self, lesson_id: &str) -> anyhow::Result<Lesson>;

    // -- Learner --

    async fn user_profile(&self) -> anyhow::Result<UserProfile>;

    async fn update_interests(&self, interests: &[String]) -> anyhow::Result<()>;

    async fn submit_assessment(
        &self,
        lesson_id: &str,
        answers: &[SubmittedAnswer],
    ) -> anyhow::Result<AssessmentResponse>;

    // -- Callables --

    async fn grade_quiz(&self, payload: &QuizPayload) -> anyhow::Result<QuizGrade>;

    async fn generate_personalized_content(
        &self,
        payload: &serde_json::Value,
    ) -> anyhow::Result<PersonalizedContent>;

    // -- Mentor resources --

    async fn topic_resources(&self, topic_id: &str) -> anyhow::Result<Vec<Resource>>;

    async fn upload_resource(&self, upload: &ResourceUpload) -> anyhow::Result<()>;

    // -- Community --

    async fn community_posts(&self, topic_id: &str) -> anyhow::Result<Vec<Post>>;

    async fn create_post(&self, post: &NewPost) -> anyhow::Result<()>;

    async fn post_detail(&self, post_id: &str) -> anyhow::Result<PostDetail>;

    async fn reply_to_post(&self, post_id: &str, reply: &NewReply) -> anyhow::Result<()>;

    // -- Mentorship --

    async fn apply_as_mentor(&self, application: &MentorApplication) -> anyhow::Result<()>;

    async fn mentors(&self, topic_id: &str) -> anyhow::Result<Vec<Mentor>>;

    async fn request_mentorship(&self, draft: &MentorshipRequestDraft) -> anyhow::Result<()>;

    /// Requests addressed to the signed-in mentor.
    async fn mentor_dashboard(&self) -> anyhow::Result<Vec<MentorshipRequest>>;

    async fn respond_to_request(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> anyhow::Result<()>;

    /// Requests the signed-in learner has sent.
    async fn sent_requests(&self) -> anyhow::Result<Vec<MentorshipRequest>>;

    // -- Chat --

    async fn chat_messages(&self, request_id: &str) -> anyhow::Result<Vec<ChatMessage>>;

    async fn send_chat_message(&self, request_id: &str, text: &str) -> anyhow::Result<()>;
}
