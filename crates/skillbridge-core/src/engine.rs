//! The learning service.
//!
//! Composes the pure rules with a [`LearningBackend`] and applies the failure
//! policy: read views degrade to empty with a warning, quiz grading and
//! personalized content fall back to local results, and learner actions
//! return their error to the caller without retrying.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use futures::future::try_join_all;

use crate::assessment::{self, AnswerSheet, NextStep};
use crate::community::{self, ChatMessage, NewPost, NewReply, Post, PostDetail};
use crate::discovery::{self, HomeFeed, TopicView};
use crate::error::LearningError;
use crate::grading::{grade_locally, GradeOutcome, QuizPayload};
use crate::mentorship::{
    Mentor, MentorApplication, MentorshipRequest, MentorshipRequestDraft, RequestStatus,
    Resource, ResourceUpload,
};
use crate::model::{AssessmentResponse, Lesson, PersonalizedContent, UserProfile};
use crate::profile::normalize_interests;
use crate::progress::{self, TopicProgress};
use crate::progression::{self, LessonState};
use crate::traits::LearningBackend;

/// A topic's lessons together with the learner's completed set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonBoard {
    pub topic_id: String,
    pub lessons: Vec<Lesson>,
    pub completed: BTreeSet<String>,
}

impl LessonBoard {
    pub fn new(
        topic_id: impl Into<String>,
        lessons: Vec<Lesson>,
        completed: BTreeSet<String>,
    ) -> Self {
        Self {
            topic_id: topic_id.into(),
            lessons,
            completed,
        }
    }

    /// Lock and completion state, derived on every call.
    pub fn states(&self) -> Vec<LessonState<'_>> {
        progression::lesson_states(&self.lessons, &self.completed)
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    pub fn check_access(&self, lesson_id: &str) -> Result<&Lesson, LearningError> {
        let lesson = self
            .lesson(lesson_id)
            .ok_or_else(|| LearningError::LessonNotFound(lesson_id.to_string()))?;
        progression::check_access(lesson, &self.lessons, &self.completed)?;
        Ok(lesson)
    }

    pub fn can_graduate(&self) -> bool {
        progression::can_graduate(&self.lessons, &self.completed)
    }

    pub fn resume_target(&self) -> Option<&Lesson> {
        progress::resume_target(&self.lessons, &self.completed)
    }

    /// Mark a lesson completed after a passing submission.
    pub fn record(&mut self, lesson_id: &str, response: &AssessmentResponse) {
        if response.passed() {
            self.completed.insert(lesson_id.to_string());
        }
    }
}

/// Client-side orchestration over a backend.
pub struct LearningService {
    backend: Arc<dyn LearningBackend>,
}

impl LearningService {
    pub fn new(backend: Arc<dyn LearningBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn LearningBackend {
        self.backend.as_ref()
    }

    fn ensure_signed_in(&self) -> Result<(), LearningError> {
        if self.backend.is_authenticated() {
            Ok(())
        } else {
            Err(LearningError::NotSignedIn)
        }
    }

    /// Profile, or an empty profile when it cannot be loaded.
    async fn profile_or_default(&self) -> UserProfile {
        match self.backend.user_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("failed to load profile: {e:#}");
                UserProfile::default()
            }
        }
    }

    async fn topics_or_empty(&self) -> Vec<crate::model::Topic> {
        match self.backend.topics().await {
            Ok(topics) => topics,
            Err(e) => {
                tracing::warn!("failed to load topics: {e:#}");
                Vec::new()
            }
        }
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.ensure_signed_in()?;
        self.backend.user_profile().await
    }

    /// Home screen topics: recommendations when interests match.
    pub async fn home(&self) -> Result<HomeFeed> {
        self.ensure_signed_in()?;
        let (topics, profile) = futures::join!(self.topics_or_empty(), self.profile_or_default());
        Ok(discovery::home_feed(&topics, &profile.interests))
    }

    /// All topics matching `query`, flagged with the learner's interests.
    pub async fn browse_topics(&self, query: &str) -> Result<Vec<TopicView>> {
        self.ensure_signed_in()?;
        let (topics, profile) = futures::join!(self.topics_or_empty(), self.profile_or_default());
        let found = discovery::search_topics(&topics, query);
        Ok(discovery::topic_views(&found, &profile.interests))
    }

    /// Lessons of a topic with lock state. Empty when loading fails.
    pub async fn lesson_board(&self, topic_id: &str) -> Result<LessonBoard> {
        self.ensure_signed_in()?;
        let loaded = futures::try_join!(
            self.backend.lessons(topic_id),
            self.backend.user_profile()
        );
        match loaded {
            Ok((lessons, profile)) => Ok(LessonBoard::new(
                topic_id,
                lessons,
                profile.completed_lessons,
            )),
            Err(e) => {
                tracing::warn!("failed to load lessons for {topic_id}: {e:#}");
                Ok(LessonBoard::new(topic_id, Vec::new(), BTreeSet::new()))
            }
        }
    }

    /// Progress for every started topic. Empty when any part fails to load.
    pub async fn my_courses(&self) -> Result<Vec<TopicProgress>> {
        self.ensure_signed_in()?;
        let loaded = async {
            let (topics, profile) =
                futures::try_join!(self.backend.topics(), self.backend.user_profile())?;
            let lessons = try_join_all(topics.iter().map(|t| self.backend.lessons(&t.id))).await?;
            anyhow::Ok((topics.into_iter().zip(lessons).collect::<Vec<_>>(), profile))
        }
        .await;

        match loaded {
            Ok((entries, profile)) => Ok(progress::my_courses(&entries, &profile.completed_lessons)),
            Err(e) => {
                tracing::warn!("failed to load courses: {e:#}");
                Ok(Vec::new())
            }
        }
    }

    /// Open a lesson from a board, fetching the full document when the board
    /// only holds a summary. Locked lessons are refused without a request.
    pub async fn open_lesson(&self, board: &LessonBoard, lesson_id: &str) -> Result<Lesson> {
        let summary = board.check_access(lesson_id)?;
        if summary.is_playable() {
            return Ok(summary.clone());
        }
        self.ensure_signed_in()?;
        tracing::debug!("fetching full lesson {lesson_id}");
        let mut lesson = self.backend.lesson(lesson_id).await?;
        if lesson.topic_id.is_none() {
            lesson.topic_id = Some(board.topic_id.clone());
        }
        // Full documents may omit listing fields.
        if lesson.order == 0 {
            lesson.order = summary.order;
        }
        lesson.difficulty = summary.difficulty;
        Ok(lesson)
    }

    /// Submit a completed answer sheet. The backend decides the outcome.
    ///
    /// Incomplete or invalid sheets are rejected locally. A failed send leaves
    /// the sheet editable so it can be sent again.
    pub async fn submit_assessment(
        &self,
        lesson: &Lesson,
        sheet: &mut AnswerSheet,
    ) -> Result<AssessmentResponse> {
        let assessment = lesson
            .assessment
            .as_ref()
            .ok_or_else(|| LearningError::MissingAssessment(lesson.id.clone()))?;
        let answers = sheet.submission(assessment)?;
        if let Err(e) = self.ensure_signed_in() {
            sheet.reopen();
            return Err(e.into());
        }

        tracing::debug!(lesson = %lesson.id, answers = answers.len(), "submitting assessment");
        match self.backend.submit_assessment(&lesson.id, &answers).await {
            Ok(response) => {
                tracing::info!(
                    lesson = %lesson.id,
                    status = %response.status,
                    score = response.score,
                    "assessment graded"
                );
                Ok(response)
            }
            Err(e) => {
                sheet.reopen();
                Err(e)
            }
        }
    }

    pub fn next_step(&self, response: &AssessmentResponse) -> NextStep {
        assessment::next_step(response)
    }

    /// Fetch the lesson a passing response points to.
    pub async fn load_next_lesson(&self, response: &AssessmentResponse) -> Result<Option<Lesson>> {
        match assessment::next_step(response) {
            NextStep::Advance { next_lesson_id } => {
                self.ensure_signed_in()?;
                Ok(Some(self.backend.lesson(&next_lesson_id).await?))
            }
            _ => Ok(None),
        }
    }

    /// Grade remotely, falling back to a simulated local grade.
    pub async fn grade_quiz(&self, payload: &QuizPayload) -> GradeOutcome {
        match self.backend.grade_quiz(payload).await {
            Ok(grade) => GradeOutcome {
                grade,
                simulated: false,
            },
            Err(e) => {
                tracing::warn!("gradeQuiz failed, grading locally: {e:#}");
                GradeOutcome {
                    grade: grade_locally(payload),
                    simulated: true,
                }
            }
        }
    }

    pub async fn personalized_content(&self, payload: &serde_json::Value) -> PersonalizedContent {
        match self.backend.generate_personalized_content(payload).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("generatePersonalizedContent failed: {e:#}");
                PersonalizedContent { created: false }
            }
        }
    }

    /// Normalize and store the learner's interests.
    pub async fn update_interests<I, S>(&self, selection: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let interests = normalize_interests(selection)?;
        self.ensure_signed_in()?;
        self.backend.update_interests(&interests).await?;
        Ok(interests)
    }

    // -- Resources --

    pub async fn resources(&self, topic_id: &str) -> Result<Vec<Resource>> {
        self.ensure_signed_in()?;
        Ok(self
            .backend
            .topic_resources(topic_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("failed to load resources for {topic_id}: {e:#}");
                Vec::new()
            }))
    }

    pub async fn upload_resource(&self, upload: &ResourceUpload) -> Result<()> {
        self.ensure_signed_in()?;
        self.backend.upload_resource(upload).await
    }

    // -- Community --

    pub async fn community_posts(&self, topic_id: &str) -> Result<Vec<Post>> {
        self.ensure_signed_in()?;
        Ok(self
            .backend
            .community_posts(topic_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("failed to load posts for {topic_id}: {e:#}");
                Vec::new()
            }))
    }

    pub async fn post_detail(&self, post_id: &str) -> Result<PostDetail> {
        self.ensure_signed_in()?;
        self.backend.post_detail(post_id).await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<()> {
        self.ensure_signed_in()?;
        self.backend.create_post(post).await
    }

    pub async fn reply_to_post(&self, post_id: &str, reply: &NewReply) -> Result<()> {
        self.ensure_signed_in()?;
        self.backend.reply_to_post(post_id, reply).await
    }

    // -- Mentorship --

    /// The prefilled application for a learner who finished every hard lesson.
    pub fn graduation_application(
        &self,
        board: &LessonBoard,
        topic_name: &str,
    ) -> Option<MentorApplication> {
        board
            .can_graduate()
            .then(|| MentorApplication::graduate(&board.topic_id, topic_name))
    }

    pub async fn apply_as_mentor(&self, application: &MentorApplication) -> Result<()> {
        self.ensure_signed_in()?;
        self.backend.apply_as_mentor(application).await?;
        tracing::info!(topics = ?application.topics, "mentor application accepted");
        Ok(())
    }

    pub async fn mentors(&self, topic_id: &str) -> Result<Vec<Mentor>> {
        self.ensure_signed_in()?;
        Ok(self.backend.mentors(topic_id).await.unwrap_or_else(|e| {
            tracing::warn!("failed to load mentors for {topic_id}: {e:#}");
            Vec::new()
        }))
    }

    pub async fn request_mentorship(&self, draft: &MentorshipRequestDraft) -> Result<()> {
        self.ensure_signed_in()?;
        self.backend.request_mentorship(draft).await
    }

    pub async fn mentor_dashboard(&self) -> Result<Vec<MentorshipRequest>> {
        self.ensure_signed_in()?;
        Ok(self.backend.mentor_dashboard().await.unwrap_or_else(|e| {
            tracing::warn!("failed to load mentor dashboard: {e:#}");
            Vec::new()
        }))
    }

    pub async fn sent_requests(&self) -> Result<Vec<MentorshipRequest>> {
        self.ensure_signed_in()?;
        Ok(self.backend.sent_requests().await.unwrap_or_else(|e| {
            tracing::warn!("failed to load sent requests: {e:#}");
            Vec::new()
        }))
    }

    /// Accept or reject a pending request.
    pub async fn respond_to_request(
        &self,
        request: &MentorshipRequest,
        to: RequestStatus,
    ) -> Result<RequestStatus> {
        let status = request.status.transition(to)?;
        self.ensure_signed_in()?;
        self.backend.respond_to_request(&request.id, status).await?;
        Ok(status)
    }

    /// Decide a request known only by id, looking it up on the dashboard.
    pub async fn respond_by_id(&self, request_id: &str, to: RequestStatus) -> Result<RequestStatus> {
        self.ensure_signed_in()?;
        let dashboard = self.backend.mentor_dashboard().await?;
        let request = dashboard
            .iter()
            .find(|r| r.id == request_id)
            .ok_or_else(|| anyhow::anyhow!("no mentorship request {request_id} on your dashboard"))?;
        self.respond_to_request(request, to).await
    }

    // -- Chat --

    pub async fn chat_messages(&self, request_id: &str) -> Result<Vec<ChatMessage>> {
        self.ensure_signed_in()?;
        Ok(self
            .backend
            .chat_messages(request_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("failed to load chat {request_id}: {e:#}");
                Vec::new()
            }))
    }

    pub async fn send_chat_message(&self, request_id: &str, text: &str) -> Result<()> {
        let text = community::chat_text(text)?;
        self.ensure_signed_in()?;
        self.backend.send_chat_message(request_id, text).await
    }
}
