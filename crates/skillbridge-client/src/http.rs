//! SkillBridge REST and callable-function backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use skillbridge_core::community::{ChatMessage, NewPost, NewReply, Post, PostDetail};
use skillbridge_core::grading::{QuizGrade, QuizPayload};
use skillbridge_core::mentorship::{
    Mentor, MentorApplication, MentorshipRequest, MentorshipRequestDraft, RequestStatus,
    Resource, ResourceUpload,
};
use skillbridge_core::model::{
    AssessmentResponse, Lesson, PersonalizedContent, SubmittedAnswer, Topic, UserProfile,
};
use skillbridge_core::traits::LearningBackend;

use crate::auth::TokenProvider;
use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "https://skillbridge-backend-2-gq5c.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub api_url: String,
    /// Host serving full lesson documents and assessments. Defaults to `api_url`.
    pub content_url: Option<String>,
    /// Base URL for callable functions (`gradeQuiz`, ...). Callables fail fast
    /// when unset.
    pub functions_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            content_url: None,
            functions_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Backend speaking JSON over HTTPS with a bearer ID token.
pub struct HttpBackend {
    api_url: String,
    content_url: String,
    functions_url: Option<String>,
    timeout_secs: u64,
    tokens: Arc<dyn TokenProvider>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(options: HttpOptions, tokens: Arc<dyn TokenProvider>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| ClientError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        let api_url = options.api_url.trim_end_matches('/').to_string();
        let content_url = options
            .content_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_url.clone());

        Ok(Self {
            api_url,
            content_url,
            functions_url: options
                .functions_url
                .map(|u| u.trim_end_matches('/').to_string()),
            timeout_secs: options.timeout_secs,
            tokens,
            client,
        })
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// `base` followed by `segments`, each percent-encoded so an id holding
    /// `/`, `?` or `#` stays a single path segment.
    fn url(base: &str, segments: &[&str]) -> Result<String, ClientError> {
        let mut url = reqwest::Url::parse(base)
            .map_err(|e| ClientError::NetworkError(format!("invalid base URL {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::NetworkError(format!("base URL cannot take a path: {base}")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Send a request and return the body of a successful response.
    ///
    /// The token is checked before anything is built, so a signed-out client
    /// never touches the network.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<String, ClientError> {
        let token = self.tokens.token().ok_or(ClientError::NotAuthenticated)?;

        tracing::debug!(%method, url, "sending request");
        let mut request = self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {token}"))
            .header("content-type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;
        if !status.is_success() {
            return Err(ClientError::from_response(status.as_u16(), &text));
        }
        Ok(text)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let text = self.execute::<()>(Method::GET, url, None).await?;
        decode(&text)
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let text = self.execute(method, url, Some(body)).await?;
        decode(&text)
    }

    /// Send a write whose response body carries nothing the client needs.
    async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<(), ClientError> {
        self.execute(method, url, Some(body)).await.map(|_| ())
    }

    /// Invoke a callable function: `POST {functions_url}/{name}` with
    /// `{"data": payload}`, answered by `{"result": ...}`.
    async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        name: &str,
        payload: &P,
    ) -> Result<T, ClientError> {
        let base = self
            .functions_url
            .as_deref()
            .ok_or_else(|| ClientError::FunctionUnavailable(name.to_string()))?;
        let envelope: CallableResponse<T> = self
            .send(
                Method::POST,
                &format!("{base}/{name}"),
                &CallableRequest { data: payload },
            )
            .await?;
        Ok(envelope.result)
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ClientError> {
    serde_json::from_str(text).map_err(|e| ClientError::Decode(e.to_string()))
}

#[derive(Serialize)]
struct CallableRequest<'a, P> {
    data: &'a P,
}

#[derive(Deserialize)]
struct CallableResponse<T> {
    result: T,
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    answers: &'a [SubmittedAnswer],
}

#[derive(Serialize)]
struct InterestsBody<'a> {
    interests: &'a [String],
}

#[derive(Serialize)]
struct StatusBody {
    status: RequestStatus,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    text: &'a str,
}

#[async_trait]
impl LearningBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn is_authenticated(&self) -> bool {
        self.tokens.token().is_some()
    }

    #[instrument(skip(self))]
    async fn topics(&self) -> anyhow::Result<Vec<Topic>> {
        Ok(self.get(&self.api("/topics")).await?)
    }

    #[instrument(skip(self))]
    async fn lessons(&self, topic_id: &str) -> anyhow::Result<Vec<Lesson>> {
        Ok(self.get(&Self::url(&self.api_url, &["lessons", topic_id])?).await?)
    }

    /// Full lesson document. The content host serves `/lessons/{id}`; older
    /// deployments only know `/lesson/{id}`.
    #[instrument(skip(self))]
    async fn lesson(&self, lesson_id: &str) -> anyhow::Result<Lesson> {
        let primary = Self::url(&self.content_url, &["lessons", lesson_id])?;
        match self.get(&primary).await {
            Ok(lesson) => Ok(lesson),
            Err(e @ (ClientError::NotAuthenticated | ClientError::AuthenticationFailed(_))) => {
                Err(e.into())
            }
            Err(e) => {
                tracing::debug!("{primary} failed ({e}), trying legacy path");
                let legacy = Self::url(&self.content_url, &["lesson", lesson_id])?;
                Ok(self.get(&legacy).await?)
            }
        }
    }

    #[instrument(skip(self))]
    async fn user_profile(&self) -> anyhow::Result<UserProfile> {
        Ok(self.get(&self.api("/user-profile")).await?)
    }

    #[instrument(skip(self))]
    async fn update_interests(&self, interests: &[String]) -> anyhow::Result<()> {
        Ok(self
            .send_unit(
                Method::PUT,
                &self.api("/user-profile"),
                &InterestsBody { interests },
            )
            .await?)
    }

    #[instrument(skip(self, answers), fields(answers = answers.len()))]
    async fn submit_assessment(
        &self,
        lesson_id: &str,
        answers: &[SubmittedAnswer],
    ) -> anyhow::Result<AssessmentResponse> {
        let url = Self::url(&self.content_url, &["assessments", lesson_id, "submit"])?;
        Ok(self
            .send(Method::POST, &url, &SubmitBody { answers })
            .await?)
    }

    #[instrument(skip(self, payload))]
    async fn grade_quiz(&self, payload: &QuizPayload) -> anyhow::Result<QuizGrade> {
        Ok(self.call("gradeQuiz", payload).await?)
    }

    #[instrument(skip(self, payload))]
    async fn generate_personalized_content(
        &self,
        payload: &serde_json::Value,
    ) -> anyhow::Result<PersonalizedContent> {
        Ok(self.call("generatePersonalizedContent", payload).await?)
    }

    #[instrument(skip(self))]
    async fn topic_resources(&self, topic_id: &str) -> anyhow::Result<Vec<Resource>> {
        Ok(self.get(&Self::url(&self.api_url, &["content", topic_id])?).await?)
    }

    #[instrument(skip(self, upload), fields(topic = %upload.topic_id))]
    async fn upload_resource(&self, upload: &ResourceUpload) -> anyhow::Result<()> {
        Ok(self
            .send_unit(Method::POST, &self.api("/content"), upload)
            .await?)
    }

    #[instrument(skip(self))]
    async fn community_posts(&self, topic_id: &str) -> anyhow::Result<Vec<Post>> {
        Ok(self
            .get(&Self::url(&self.api_url, &["community", topic_id])?)
            .await?)
    }

    #[instrument(skip(self, post), fields(topic = %post.topic_id))]
    async fn create_post(&self, post: &NewPost) -> anyhow::Result<()> {
        Ok(self
            .send_unit(Method::POST, &self.api("/community"), post)
            .await?)
    }

    #[instrument(skip(self))]
    async fn post_detail(&self, post_id: &str) -> anyhow::Result<PostDetail> {
        Ok(self
            .get(&Self::url(&self.api_url, &["community", "post", post_id])?)
            .await?)
    }

    #[instrument(skip(self, reply))]
    async fn reply_to_post(&self, post_id: &str, reply: &NewReply) -> anyhow::Result<()> {
        Ok(self
            .send_unit(
                Method::POST,
                &Self::url(&self.api_url, &["community", "post", post_id, "reply"])?,
                reply,
            )
            .await?)
    }

    #[instrument(skip(self, application))]
    async fn apply_as_mentor(&self, application: &MentorApplication) -> anyhow::Result<()> {
        Ok(self
            .send_unit(Method::POST, &self.api("/mentorship/apply"), application)
            .await?)
    }

    #[instrument(skip(self))]
    async fn mentors(&self, topic_id: &str) -> anyhow::Result<Vec<Mentor>> {
        Ok(self
            .get(&Self::url(&self.api_url, &["mentorship", "list", topic_id])?)
            .await?)
    }

    #[instrument(skip(self, draft), fields(mentor = %draft.mentor_id))]
    async fn request_mentorship(&self, draft: &MentorshipRequestDraft) -> anyhow::Result<()> {
        Ok(self
            .send_unit(Method::POST, &self.api("/mentorship/request"), draft)
            .await?)
    }

    #[instrument(skip(self))]
    async fn mentor_dashboard(&self) -> anyhow::Result<Vec<MentorshipRequest>> {
        Ok(self.get(&self.api("/mentorship/dashboard")).await?)
    }

    #[instrument(skip(self))]
    async fn respond_to_request(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> anyhow::Result<()> {
        Ok(self
            .send_unit(
                Method::PUT,
                &Self::url(&self.api_url, &["mentorship", "request", request_id])?,
                &StatusBody { status },
            )
            .await?)
    }

    #[instrument(skip(self))]
    async fn sent_requests(&self) -> anyhow::Result<Vec<MentorshipRequest>> {
        Ok(self.get(&self.api("/mentorship/requests/sent")).await?)
    }

    #[instrument(skip(self))]
    async fn chat_messages(&self, request_id: &str) -> anyhow::Result<Vec<ChatMessage>> {
        Ok(self.get(&Self::url(&self.api_url, &["chat", request_id])?).await?)
    }

    #[instrument(skip(self, text))]
    async fn send_chat_message(&self, request_id: &str, text: &str) -> anyhow::Result<()> {
        Ok(self
            .send_unit(
                Method::POST,
                &Self::url(&self.api_url, &["chat", request_id])?,
                &ChatBody { text },
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use skillbridge_core::grading::{MicroQuestion, MicroQuiz, QuizAnswer};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> HttpBackend {
        backend_with(server, StaticToken::new("test-token"), true)
    }

    fn backend_with(server: &MockServer, token: StaticToken, functions: bool) -> HttpBackend {
        HttpBackend::new(
            HttpOptions {
                api_url: server.uri(),
                content_url: None,
                functions_url: functions.then(|| format!("{}/fn", server.uri())),
                timeout_secs: 5,
            },
            Arc::new(token),
        )
        .unwrap()
    }

    fn client_error(err: &anyhow::Error) -> &ClientError {
        err.downcast_ref::<ClientError>().unwrap()
    }

    #[tokio::test]
    async fn topics_with_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/topics"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "finance", "name": "Personal Finance", "description": "Money"},
                {"id": "coding", "name": "Coding", "description": null}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let topics = backend(&server).topics().await.unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[1].description, "");
    }

    #[tokio::test]
    async fn signed_out_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let backend = backend_with(&server, StaticToken::signed_out(), true);
        assert!(!backend.is_authenticated());
        let err = backend.topics().await.unwrap_err();
        assert!(matches!(client_error(&err), ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn error_body_becomes_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lessons/finance"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "Topic not found"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server).lessons("finance").await.unwrap_err();
        assert_eq!(err.to_string(), "Topic not found");
        assert!(matches!(
            client_error(&err),
            ClientError::ApiError { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/user-profile"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;

        let err = backend(&server).user_profile().await.unwrap_err();
        assert!(matches!(
            client_error(&err),
            ClientError::AuthenticationFailed(_)
        ));
    }

    #[tokio::test]
    async fn lesson_falls_back_to_legacy_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lessons/fin-1"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lesson/fin-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "fin-1",
                "title": "Budgeting",
                "xp": 20,
                "content": [{"type": "paragraph", "text": "Track spending."}],
                "assessment": {"passingScore": 0.7, "questions": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lesson = backend(&server).lesson("fin-1").await.unwrap();
        assert_eq!(lesson.title, "Budgeting");
        assert!(lesson.is_playable());
    }

    #[tokio::test]
    async fn submit_posts_answers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/assessments/fin-1/submit"))
            .and(body_json(serde_json::json!({
                "answers": [{"questionId": "q1", "selectedOptionId": "b"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "passed",
                "score": 1.0,
                "xpEarned": 20,
                "nextLessonId": "fin-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answers = vec![SubmittedAnswer {
            question_id: "q1".into(),
            selected_option_id: "b".into(),
        }];
        let response = backend(&server)
            .submit_assessment("fin-1", &answers)
            .await
            .unwrap();
        assert!(response.passed());
        assert_eq!(response.xp_earned, 20);
    }

    #[tokio::test]
    async fn interests_and_status_bodies() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/user-profile"))
            .and(body_json(serde_json::json!({"interests": ["finance"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/mentorship/request/r1"))
            .and(body_json(serde_json::json!({"status": "accepted"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server);
        backend
            .update_interests(&["finance".to_string()])
            .await
            .unwrap();
        backend
            .respond_to_request("r1", RequestStatus::Accepted)
            .await
            .unwrap();
    }

    fn quiz() -> QuizPayload {
        QuizPayload {
            quiz: MicroQuiz {
                id: None,
                questions: vec![MicroQuestion {
                    id: "m1".into(),
                    question_text: "?".into(),
                    options: vec!["a".into(), "b".into()],
                    answer_index: 0,
                    xp: Some(15),
                }],
            },
            answers: vec![QuizAnswer {
                question_id: "m1".into(),
                selected_index: 0,
            }],
        }
    }

    #[tokio::test]
    async fn callable_wraps_data_and_result() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/fn/gradeQuiz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"earned": 15, "total": 15}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let grade = backend(&server).grade_quiz(&quiz()).await.unwrap();
        assert_eq!(grade, QuizGrade { earned: 15, total: 15 });
    }

    #[tokio::test]
    async fn callable_without_functions_url_is_unavailable() {
        let server = MockServer::start().await;
        let backend = backend_with(&server, StaticToken::new("t"), false);
        let err = backend.grade_quiz(&quiz()).await.unwrap_err();
        assert!(matches!(
            client_error(&err),
            ClientError::FunctionUnavailable(name) if name == "gradeQuiz"
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/mentorship/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = backend(&server).mentor_dashboard().await.unwrap_err();
        assert!(matches!(client_error(&err), ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn chat_round_trip() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chat/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"_id": "m1", "text": "Hi!", "createdAt": "2024-03-10T10:00:00Z",
                 "user": {"_id": "u2", "name": "Mentor"}}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/r1"))
            .and(body_json(serde_json::json!({"text": "Thanks"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "m2"})))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server);
        let messages = backend.chat_messages("r1").await.unwrap();
        assert_eq!(messages[0].sender(), "Mentor");
        backend.send_chat_message("r1", "Thanks").await.unwrap();
    }

    #[tokio::test]
    async fn ids_stay_a_single_path_segment() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/chat/a%2Fb%3Fc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/community/post/p%231/reply"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server);
        assert!(backend.chat_messages("a/b?c").await.unwrap().is_empty());
        backend
            .reply_to_post("p#1", &NewReply {
                content: "Same here".into(),
                author_name: None,
            })
            .await
            .unwrap();
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        assert_eq!(
            HttpBackend::url("https://content.example/v2", &["lessons", "fin 1"]).unwrap(),
            "https://content.example/v2/lessons/fin%201"
        );
        assert_eq!(
            HttpBackend::url("https://api.example", &["chat", "r1"]).unwrap(),
            "https://api.example/chat/r1"
        );
        assert!(HttpBackend::url("not a url", &["x"]).is_err());
    }
}
