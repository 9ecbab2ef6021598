//! The seam between the orchestrator and the external interview services.

use crate::error::ServiceResult;
use crate::wire::{
    ComplexityRequest, ComplexityResponse, HintRequest, HintResponse, InterviewAnswerRequest,
    InterviewAnswerResponse, InterviewQuestionsRequest, InterviewQuestionsResponse,
    RunCodeRequest, RunCodeResponse, SoftSkillsRequest, SoftSkillsResponse, StartSessionRequest,
    StartSessionResponse, SubmitRoundRequest, SubmitRoundResponse, Task,
};
use async_trait::async_trait;

/// Request/response access to every service the interview depends on.
///
/// Implementations return responses as decoded from the wire; the caller is
/// responsible for running [`crate::wire::Validate`] before use. Each method
/// is an independent suspension point and may fail on its own.
#[async_trait]
pub trait InterviewService: Send + Sync {
    async fn start_session(&self, req: &StartSessionRequest) -> ServiceResult<StartSessionResponse>;

    async fn next_task(&self, session_id: &str) -> ServiceResult<Task>;

    async fn run_code(&self, req: &RunCodeRequest) -> ServiceResult<RunCodeResponse>;

    async fn hint(&self, req: &HintRequest) -> ServiceResult<HintResponse>;

    async fn check_complexity(&self, req: &ComplexityRequest) -> ServiceResult<ComplexityResponse>;

    async fn evaluate_soft_skills(&self, req: &SoftSkillsRequest) -> ServiceResult<SoftSkillsResponse>;

    async fn submit_round(&self, req: &SubmitRoundRequest) -> ServiceResult<SubmitRoundResponse>;

    async fn interview_questions(
        &self,
        req: &InterviewQuestionsRequest,
    ) -> ServiceResult<InterviewQuestionsResponse>;

    async fn interview_answer(
        &self,
        req: &InterviewAnswerRequest,
    ) -> ServiceResult<InterviewAnswerResponse>;
}
