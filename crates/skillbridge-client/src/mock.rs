//! In-memory backend for offline use and testing.
//!
//! Serves topics and lessons from a [`Catalog`] and keeps every write (profile,
//! posts, requests, chat) in process memory. The learner profile can be kept
//! in a JSON file so progress survives between runs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};

use skillbridge_core::assessment::score_answers;
use skillbridge_core::catalog::Catalog;
use skillbridge_core::community::{ChatMessage, ChatUser, NewPost, NewReply, Post, PostDetail, Reply};
use skillbridge_core::grading::{grade_locally, QuizGrade, QuizPayload};
use skillbridge_core::mentorship::{
    Mentor, MentorApplication, MentorshipRequest, MentorshipRequestDraft, RequestStatus,
    Resource, ResourceUpload,
};
use skillbridge_core::model::{
    AssessmentResponse, AssessmentStatus, ContentBlock, Lesson, PersonalizedContent,
    RemedialLesson, SubmittedAnswer, Topic, UserProfile,
};
use skillbridge_core::traits::LearningBackend;

const OFFLINE_USER_ID: &str = "offline-learner";

#[derive(Default)]
struct State {
    profile: UserProfile,
    /// Posts by topic id, oldest first.
    posts: HashMap<String, Vec<Post>>,
    replies: HashMap<String, Vec<Reply>>,
    /// Requests sent by the learner, in sending order.
    requests: Vec<MentorshipRequest>,
    messages: HashMap<String, Vec<ChatMessage>>,
    resources: HashMap<String, Vec<Resource>>,
    /// Mentors by topic id.
    mentors: HashMap<String, Vec<Mentor>>,
}

/// A backend that never leaves the process.
pub struct MockBackend {
    catalog: Catalog,
    state: Mutex<State>,
    today: Option<NaiveDate>,
    profile_file: Option<PathBuf>,
    call_count: AtomicU32,
    submission_count: AtomicU32,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl MockBackend {
    /// An empty backend with a fresh learner profile.
    pub fn new() -> Self {
        Self::from_catalog(Catalog::default())
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        let state = State {
            profile: UserProfile {
                user_id: OFFLINE_USER_ID.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        Self {
            catalog,
            state: Mutex::new(state),
            today: None,
            profile_file: None,
            call_count: AtomicU32::new(0),
            submission_count: AtomicU32::new(0),
        }
    }

    pub fn with_display_name(self, name: &str) -> Self {
        lock(&self.state).profile.name = Some(name.to_string());
        self
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        lock(&self.state).profile = profile;
        self
    }

    /// Load the learner profile from `path` when it exists, and write it back
    /// there after every change.
    pub fn with_profile_file(mut self, path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read profile {}", path.display()))?;
            let profile: UserProfile = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse profile {}", path.display()))?;
            tracing::debug!(
                completed = profile.completed_lessons.len(),
                "loaded offline profile from {}",
                path.display()
            );
            lock(&self.state).profile = profile;
        }
        self.profile_file = Some(path);
        Ok(self)
    }

    pub fn with_mentor(self, topic_id: &str, mentor: Mentor) -> Self {
        lock(&self.state)
            .mentors
            .entry(topic_id.to_string())
            .or_default()
            .push(mentor);
        self
    }

    /// Pin the date used for streak updates.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Number of backend calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Number of assessment submissions received.
    pub fn submission_count(&self) -> u32 {
        self.submission_count.load(Ordering::Relaxed)
    }

    pub fn profile_snapshot(&self) -> UserProfile {
        lock(&self.state).profile.clone()
    }

    fn save_profile(&self, profile: &UserProfile) -> anyhow::Result<()> {
        let Some(path) = &self.profile_file else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(profile)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write profile {}", path.display()))
    }

    fn hit(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn author(&self, state: &State) -> String {
        state
            .profile
            .name
            .clone()
            .unwrap_or_else(|| state.profile.user_id.clone())
    }

    fn next_lesson_after(&self, lesson: &Lesson) -> Option<String> {
        let topic_id = lesson.topic_id.as_deref()?;
        let lessons = self.catalog.lessons_for(topic_id);
        let position = lessons.iter().position(|l| l.id == lesson.id)?;
        lessons.get(position + 1).map(|l| l.id.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Review material built from a lesson's text content.
fn remedial_for(lesson: &Lesson) -> RemedialLesson {
    let content: Vec<ContentBlock> = lesson
        .content
        .iter()
        .filter(|block| !matches!(block, ContentBlock::Quiz(_)))
        .cloned()
        .collect();
    RemedialLesson {
        title: format!("Review: {}", lesson.title),
        estimated_minutes: (content.len() as u32).max(1) * 2,
        difficulty: lesson.difficulty.to_string(),
        content,
    }
}

fn summary(lesson: &Lesson) -> Lesson {
    Lesson {
        content: Vec::new(),
        assessment: None,
        ..lesson.clone()
    }
}

#[async_trait]
impl LearningBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn topics(&self) -> anyhow::Result<Vec<Topic>> {
        self.hit();
        Ok(self.catalog.topics.clone())
    }

    async fn lessons(&self, topic_id: &str) -> anyhow::Result<Vec<Lesson>> {
        self.hit();
        Ok(self
            .catalog
            .lessons_for(topic_id)
            .iter()
            .map(summary)
            .collect())
    }

    async fn lesson(&self, lesson_id: &str) -> anyhow::Result<Lesson> {
        self.hit();
        self.catalog
            .lesson(lesson_id)
            .cloned()
            .ok_or_else(|| anyhow!("lesson not found: {lesson_id}"))
    }

    async fn user_profile(&self) -> anyhow::Result<UserProfile> {
        self.hit();
        Ok(lock(&self.state).profile.clone())
    }

    async fn update_interests(&self, interests: &[String]) -> anyhow::Result<()> {
        self.hit();
        let profile = {
            let mut state = lock(&self.state);
            state.profile.interests = interests.to_vec();
            state.profile.clone()
        };
        self.save_profile(&profile)
    }

    async fn submit_assessment(
        &self,
        lesson_id: &str,
        answers: &[SubmittedAnswer],
    ) -> anyhow::Result<AssessmentResponse> {
        self.hit();
        self.submission_count.fetch_add(1, Ordering::Relaxed);

        let lesson = self
            .catalog
            .lesson(lesson_id)
            .ok_or_else(|| anyhow!("lesson not found: {lesson_id}"))?;
        let Some(assessment) = &lesson.assessment else {
            bail!("lesson {lesson_id} has no assessment");
        };

        let score = score_answers(assessment, answers);
        let response = if score >= assessment.passing_score {
            AssessmentResponse {
                status: AssessmentStatus::Passed,
                score,
                xp_earned: lesson.xp,
                next_lesson_id: self.next_lesson_after(lesson),
                remedial_lesson: None,
            }
        } else {
            AssessmentResponse {
                status: AssessmentStatus::RequiresReview,
                score,
                xp_earned: 0,
                next_lesson_id: None,
                remedial_lesson: Some(remedial_for(lesson)),
            }
        };

        let (granted, profile) = {
            let mut state = lock(&self.state);
            let granted = state
                .profile
                .apply_assessment(lesson_id, &response, self.today());
            (granted, state.profile.clone())
        };
        tracing::debug!(lesson_id, score, granted, "graded submission");
        if response.passed() {
            self.save_profile(&profile)?;
        }
        Ok(response)
    }

    async fn grade_quiz(&self, payload: &QuizPayload) -> anyhow::Result<QuizGrade> {
        self.hit();
        Ok(grade_locally(payload))
    }

    async fn generate_personalized_content(
        &self,
        _payload: &serde_json::Value,
    ) -> anyhow::Result<PersonalizedContent> {
        self.hit();
        Ok(PersonalizedContent { created: true })
    }

    async fn topic_resources(&self, topic_id: &str) -> anyhow::Result<Vec<Resource>> {
        self.hit();
        Ok(lock(&self.state)
            .resources
            .get(topic_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upload_resource(&self, upload: &ResourceUpload) -> anyhow::Result<()> {
        self.hit();
        let mut state = lock(&self.state);
        if !state.profile.is_mentor {
            bail!("only mentors can upload resources");
        }
        let resource = Resource {
            id: new_id(),
            title: upload.title.clone(),
            description: String::new(),
            url: upload.url.clone(),
            kind: upload.kind,
            mentor_name: self.author(&state),
        };
        state
            .resources
            .entry(upload.topic_id.clone())
            .or_default()
            .push(resource);
        Ok(())
    }

    async fn community_posts(&self, topic_id: &str) -> anyhow::Result<Vec<Post>> {
        self.hit();
        // Newest first, like the live board.
        let mut posts = lock(&self.state)
            .posts
            .get(topic_id)
            .cloned()
            .unwrap_or_default();
        posts.reverse();
        Ok(posts)
    }

    async fn create_post(&self, post: &NewPost) -> anyhow::Result<()> {
        self.hit();
        let mut state = lock(&self.state);
        let author_name = post
            .author_name
            .clone()
            .unwrap_or_else(|| self.author(&state));
        let stored = Post {
            id: new_id(),
            title: post.title.clone(),
            content: post.content.clone(),
            author_name,
            created_at: Some(serde_json::Value::String(Utc::now().to_rfc3339())),
            reply_count: 0,
        };
        state
            .posts
            .entry(post.topic_id.clone())
            .or_default()
            .push(stored);
        Ok(())
    }

    async fn post_detail(&self, post_id: &str) -> anyhow::Result<PostDetail> {
        self.hit();
        let state = lock(&self.state);
        let post = state
            .posts
            .values()
            .flatten()
            .find(|p| p.id == post_id)
            .cloned()
            .ok_or_else(|| anyhow!("post not found: {post_id}"))?;
        let replies = state.replies.get(post_id).cloned().unwrap_or_default();
        Ok(PostDetail { post, replies })
    }

    async fn reply_to_post(&self, post_id: &str, reply: &NewReply) -> anyhow::Result<()> {
        self.hit();
        let mut state = lock(&self.state);
        let author_name = reply
            .author_name
            .clone()
            .unwrap_or_else(|| self.author(&state));
        let post = state
            .posts
            .values_mut()
            .flatten()
            .find(|p| p.id == post_id)
            .ok_or_else(|| anyhow!("post not found: {post_id}"))?;
        post.reply_count += 1;
        state
            .replies
            .entry(post_id.to_string())
            .or_default()
            .push(Reply {
                id: new_id(),
                content: reply.content.clone(),
                author_name,
            });
        Ok(())
    }

    async fn apply_as_mentor(&self, application: &MentorApplication) -> anyhow::Result<()> {
        self.hit();
        let mut state = lock(&self.state);
        state.profile.is_mentor = true;
        let mentor = Mentor {
            uid: state.profile.user_id.clone(),
            name: self.author(&state),
            bio: application.bio.clone(),
            rating: 0.0,
        };
        for topic in &application.topics {
            let mentors = state.mentors.entry(topic.clone()).or_default();
            if !mentors.iter().any(|m| m.uid == mentor.uid) {
                mentors.push(mentor.clone());
            }
        }
        let profile = state.profile.clone();
        drop(state);
        self.save_profile(&profile)
    }

    async fn mentors(&self, topic_id: &str) -> anyhow::Result<Vec<Mentor>> {
        self.hit();
        Ok(lock(&self.state)
            .mentors
            .get(topic_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn request_mentorship(&self, draft: &MentorshipRequestDraft) -> anyhow::Result<()> {
        self.hit();
        let mut state = lock(&self.state);
        let student_name = self.author(&state);
        let mentor_name = state
            .mentors
            .get(&draft.topic_id)
            .and_then(|mentors| mentors.iter().find(|m| m.uid == draft.mentor_id))
            .map(|m| m.name.clone());
        let student_id = state.profile.user_id.clone();
        state.requests.push(MentorshipRequest {
            id: new_id(),
            student_id: Some(student_id),
            student_name: Some(student_name),
            mentor_id: Some(draft.mentor_id.clone()),
            mentor_name,
            topic_id: Some(draft.topic_id.clone()),
            topic_name: draft.topic_name.clone(),
            message: draft.message.clone(),
            status: RequestStatus::Pending,
        });
        Ok(())
    }

    async fn mentor_dashboard(&self) -> anyhow::Result<Vec<MentorshipRequest>> {
        self.hit();
        let state = lock(&self.state);
        let uid = state.profile.user_id.as_str();
        Ok(state
            .requests
            .iter()
            .filter(|r| r.mentor_id.as_deref() == Some(uid))
            .cloned()
            .collect())
    }

    async fn respond_to_request(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> anyhow::Result<()> {
        self.hit();
        let mut state = lock(&self.state);
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| anyhow!("request not found: {request_id}"))?;
        request.status = request.status.transition(status)?;
        Ok(())
    }

    async fn sent_requests(&self) -> anyhow::Result<Vec<MentorshipRequest>> {
        self.hit();
        Ok(lock(&self.state).requests.clone())
    }

    async fn chat_messages(&self, request_id: &str) -> anyhow::Result<Vec<ChatMessage>> {
        self.hit();
        Ok(lock(&self.state)
            .messages
            .get(request_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_chat_message(&self, request_id: &str, text: &str) -> anyhow::Result<()> {
        self.hit();
        let mut state = lock(&self.state);
        let accepted = state
            .requests
            .iter()
            .any(|r| r.id == request_id && r.status == RequestStatus::Accepted);
        if !accepted {
            bail!("chat is only open for accepted requests");
        }
        let message = ChatMessage {
            id: new_id(),
            text: text.to_string(),
            created_at: Some(Utc::now().to_rfc3339()),
            user: ChatUser {
                id: state.profile.user_id.clone(),
                name: state.profile.name.clone(),
            },
        };
        state
            .messages
            .entry(request_id.to_string())
            .or_default()
            .push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillbridge_core::catalog::parse_catalog_str;
    use std::path::Path;

    const CATALOG: &str = r#"
[[topics]]
id = "finance"
name = "Finance"

[[lessons]]
id = "fin-1"
topic = "finance"
title = "Budgeting"
xp = 20
order = 1

[[lessons.content]]
type = "paragraph"
text = "Track every expense."

[lessons.assessment]
passing_score = 0.5

[[lessons.assessment.questions]]
id = "q1"
question = "What first?"
options = [{ id = "a", text = "Track" }, { id = "b", text = "Spend" }]
correct = "a"

[[lessons]]
id = "fin-2"
topic = "finance"
title = "Saving"
order = 2
"#;

    fn backend() -> MockBackend {
        let catalog = parse_catalog_str(CATALOG, Path::new("test.toml")).unwrap();
        MockBackend::from_catalog(catalog)
            .with_display_name("Ada")
            .with_today(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
    }

    fn answer(option: &str) -> Vec<SubmittedAnswer> {
        vec![SubmittedAnswer {
            question_id: "q1".into(),
            selected_option_id: option.into(),
        }]
    }

    #[tokio::test]
    async fn listings_are_summaries() {
        let backend = backend();
        let lessons = backend.lessons("finance").await.unwrap();
        assert_eq!(lessons.len(), 2);
        assert!(lessons.iter().all(|l| !l.is_playable()));
        assert!(backend.lesson("fin-1").await.unwrap().is_playable());
        assert!(backend.lesson("nope").await.is_err());
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn passing_submission_updates_profile_once() {
        let backend = backend();
        let response = backend.submit_assessment("fin-1", &answer("a")).await.unwrap();
        assert!(response.passed());
        assert_eq!(response.next_lesson_id.as_deref(), Some("fin-2"));

        backend.submit_assessment("fin-1", &answer("a")).await.unwrap();
        let profile = backend.profile_snapshot();
        assert_eq!(profile.total_xp, 20);
        assert_eq!(profile.current_streak, 1);
        assert_eq!(profile.last_activity_date.as_deref(), Some("2026-03-02"));
        assert!(profile.completed_lessons.contains("fin-1"));
        assert_eq!(backend.submission_count(), 2);
    }

    #[tokio::test]
    async fn failing_submission_returns_review_material() {
        let backend = backend();
        let response = backend.submit_assessment("fin-1", &answer("b")).await.unwrap();
        assert_eq!(response.status, AssessmentStatus::RequiresReview);
        let remedial = response.remedial_lesson.unwrap();
        assert_eq!(remedial.title, "Review: Budgeting");
        assert_eq!(remedial.content.len(), 1);
        assert!(backend.profile_snapshot().completed_lessons.is_empty());
    }

    #[tokio::test]
    async fn lesson_without_assessment_cannot_be_submitted() {
        let err = backend()
            .submit_assessment("fin-2", &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no assessment"));
    }

    #[tokio::test]
    async fn community_round_trip() {
        let backend = backend();
        let post = NewPost::new("finance", "Budget apps?", "Which one do you use?", None).unwrap();
        backend.create_post(&post).await.unwrap();

        let posts = backend.community_posts("finance").await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author_name, "Ada");

        let reply = NewReply::new("A spreadsheet.", None).unwrap();
        backend.reply_to_post(&posts[0].id, &reply).await.unwrap();
        let detail = backend.post_detail(&posts[0].id).await.unwrap();
        assert_eq!(detail.post.reply_count, 1);
        assert_eq!(detail.replies[0].content, "A spreadsheet.");
        assert!(backend.post_detail("missing").await.is_err());
    }

    #[tokio::test]
    async fn mentorship_request_lifecycle_and_chat() {
        let backend = backend();
        backend
            .apply_as_mentor(&MentorApplication::graduate("finance", "Finance"))
            .await
            .unwrap();
        let mentors = backend.mentors("finance").await.unwrap();
        assert_eq!(mentors.len(), 1);
        assert!(backend.profile_snapshot().is_mentor);

        let draft = MentorshipRequestDraft {
            mentor_id: mentors[0].uid.clone(),
            topic_id: "finance".into(),
            topic_name: "Finance".into(),
            message: "Help me budget".into(),
        };
        backend.request_mentorship(&draft).await.unwrap();
        let dashboard = backend.mentor_dashboard().await.unwrap();
        assert_eq!(dashboard.len(), 1);
        assert_eq!(dashboard[0].student_id.as_deref(), Some(OFFLINE_USER_ID));
        assert_eq!(dashboard[0].mentor_name.as_deref(), Some("Ada"));
        assert_eq!(dashboard[0].topic_id.as_deref(), Some("finance"));
        let id = dashboard[0].id.clone();

        assert!(backend.send_chat_message(&id, "hi").await.is_err());
        backend
            .respond_to_request(&id, RequestStatus::Accepted)
            .await
            .unwrap();
        assert!(backend
            .respond_to_request(&id, RequestStatus::Rejected)
            .await
            .is_err());

        backend.send_chat_message(&id, "hi").await.unwrap();
        let messages = backend.chat_messages(&id).await.unwrap();
        assert_eq!(messages[0].sender(), "Ada");
    }

    #[tokio::test]
    async fn uploads_require_mentor_status() {
        let backend = backend();
        let upload = ResourceUpload::new("Intro", "https://example.com/v", "finance").unwrap();
        assert!(backend.upload_resource(&upload).await.is_err());

        backend
            .apply_as_mentor(&MentorApplication::graduate("finance", "Finance"))
            .await
            .unwrap();
        backend.upload_resource(&upload).await.unwrap();
        let resources = backend.topic_resources("finance").await.unwrap();
        assert_eq!(resources[0].mentor_name, "Ada");
    }

    #[tokio::test]
    async fn profile_file_carries_progress_to_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let first = backend().with_profile_file(&path).unwrap();
        assert!(!path.exists());
        let failed = first.submit_assessment("fin-1", &answer("b")).await.unwrap();
        assert!(!failed.passed());
        assert!(!path.exists());
        first.submit_assessment("fin-1", &answer("a")).await.unwrap();
        first.update_interests(&["finance".into()]).await.unwrap();

        let second = backend().with_profile_file(&path).unwrap();
        let profile = second.profile_snapshot();
        assert!(profile.completed_lessons.contains("fin-1"));
        assert_eq!(profile.total_xp, 20);
        assert_eq!(profile.interests, vec!["finance".to_string()]);
        assert_eq!(profile.user_id, OFFLINE_USER_ID);

        second
            .apply_as_mentor(&MentorApplication::graduate("finance", "Finance"))
            .await
            .unwrap();
        assert!(backend().with_profile_file(&path).unwrap().profile_snapshot().is_mentor);
    }

    #[test]
    fn unreadable_profile_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "not json").unwrap();
        let err = backend().with_profile_file(&path).err().unwrap();
        assert!(err.to_string().contains("failed to parse profile"));
    }
}
