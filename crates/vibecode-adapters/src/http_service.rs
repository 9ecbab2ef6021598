//! `InterviewService` over HTTP/JSON.
//!
//! Endpoint paths are relative to the configured base URL:
//!
//! | Call | Method and path |
//! |---|---|
//! | start session | `POST /start` |
//! | next task | `GET /task/next?session_id=` |
//! | run code | `POST /code/run` |
//! | hint | `POST /help` |
//! | complexity | `POST /complexity/check` |
//! | soft skills | `POST /soft-skills/evaluate` |
//! | submit round | `POST /round/submit` |
//! | interview questions | `POST /interview/question` |
//! | interview answer | `POST /interview/respond` |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use vibecode_proto::wire::{
    ComplexityRequest, ComplexityResponse, HintRequest, HintResponse, InterviewAnswerRequest,
    InterviewAnswerResponse, InterviewQuestionsRequest, InterviewQuestionsResponse,
    RunCodeRequest, RunCodeResponse, SoftSkillsRequest, SoftSkillsResponse, StartSessionRequest,
    StartSessionResponse, SubmitRoundRequest, SubmitRoundResponse, Task,
};
use vibecode_proto::{InterviewService, ServiceError, ServiceResult};

/// Longest error body kept in a `ServiceError::Status`.
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Clone)]
pub struct HttpInterviewService {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpInterviewService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            timeout: None,
        }
    }

    /// Sets a per-request timeout. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ServiceResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        self.send(path, request).await
    }

    async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> ServiceResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.client.get(self.url(path)).query(query);
        self.send(path, request).await
    }

    async fn send<T>(&self, path: &str, mut request: RequestBuilder) -> ServiceResult<T>
    where
        T: DeserializeOwned,
    {
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        debug!(path, "Sending request");
        let response = request.send().await.map_err(|err| {
            warn!(path, error = %err, timeout = err.is_timeout(), "Request failed");
            ServiceError::Transport(err.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ServiceError::Transport(format!("Failed to read response body: {err}")))?;

        if !status.is_success() {
            warn!(path, status = status.as_u16(), "Service returned an error status");
            let body = match text.char_indices().nth(MAX_ERROR_BODY) {
                Some((cut, _)) => text[..cut].to_string(),
                None => text,
            };
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&text).map_err(|err| {
            warn!(path, error = %err, "Failed to decode response");
            ServiceError::Decode(err.to_string())
        })
    }
}

#[async_trait]
impl InterviewService for HttpInterviewService {
    async fn start_session(&self, req: &StartSessionRequest) -> ServiceResult<StartSessionResponse> {
        self.post("/start", req).await
    }

    async fn next_task(&self, session_id: &str) -> ServiceResult<Task> {
        self.get("/task/next", &[("session_id", session_id)]).await
    }

    async fn run_code(&self, req: &RunCodeRequest) -> ServiceResult<RunCodeResponse> {
        self.post("/code/run", req).await
    }

    async fn hint(&self, req: &HintRequest) -> ServiceResult<HintResponse> {
        self.post("/help", req).await
    }

    async fn check_complexity(&self, req: &ComplexityRequest) -> ServiceResult<ComplexityResponse> {
        self.post("/complexity/check", req).await
    }

    async fn evaluate_soft_skills(
        &self,
        req: &SoftSkillsRequest,
    ) -> ServiceResult<SoftSkillsResponse> {
        self.post("/soft-skills/evaluate", req).await
    }

    async fn submit_round(&self, req: &SubmitRoundRequest) -> ServiceResult<SubmitRoundResponse> {
        self.post("/round/submit", req).await
    }

    async fn interview_questions(
        &self,
        req: &InterviewQuestionsRequest,
    ) -> ServiceResult<InterviewQuestionsResponse> {
        self.post("/interview/question", req).await
    }

    async fn interview_answer(
        &self,
        req: &InterviewAnswerRequest,
    ) -> ServiceResult<InterviewAnswerResponse> {
        self.post("/interview/respond", req).await
    }
}
