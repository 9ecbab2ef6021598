//! Scripted interview service for deterministic testing.
//!
//! `ScriptedService` serves queued replies per endpoint in FIFO order and
//! records every call it receives. An endpoint with an empty queue fails with
//! a transport error, so tests only script the calls they care about.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use vibecode_proto::wire::{
    ComplexityRequest, ComplexityResponse, HintRequest, HintResponse, InterviewAnswerRequest,
    InterviewAnswerResponse, InterviewQuestionsRequest, InterviewQuestionsResponse,
    RunCodeRequest, RunCodeResponse, SoftSkillsRequest, SoftSkillsResponse, StartSessionRequest,
    StartSessionResponse, SubmitRoundRequest, SubmitRoundResponse, Task,
};
use vibecode_proto::{InterviewService, ServiceError, ServiceResult};

#[derive(Debug, Default)]
struct Script {
    sessions: VecDeque<ServiceResult<StartSessionResponse>>,
    tasks: VecDeque<ServiceResult<Task>>,
    runs: VecDeque<ServiceResult<RunCodeResponse>>,
    hints: VecDeque<ServiceResult<HintResponse>>,
    complexity: VecDeque<ServiceResult<ComplexityResponse>>,
    soft_skills: VecDeque<ServiceResult<SoftSkillsResponse>>,
    reviews: VecDeque<ServiceResult<SubmitRoundResponse>>,
    questions: VecDeque<ServiceResult<InterviewQuestionsResponse>>,
    reactions: VecDeque<ServiceResult<InterviewAnswerResponse>>,

    calls: Vec<&'static str>,
    run_requests: Vec<RunCodeRequest>,
    submit_requests: Vec<SubmitRoundRequest>,
    answer_requests: Vec<InterviewAnswerRequest>,
}

/// A cloneable scripted service. Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedService {
    script: Arc<Mutex<Script>>,
}

fn pop<T>(queue: &mut VecDeque<ServiceResult<T>>, endpoint: &str) -> ServiceResult<T> {
    queue.pop_front().unwrap_or_else(|| {
        Err(ServiceError::Transport(format!(
            "no scripted reply for {endpoint}"
        )))
    })
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut script)
    }

    pub fn push_session(&self, resp: StartSessionResponse) {
        self.with(|s| s.sessions.push_back(Ok(resp)));
    }

    pub fn fail_session(&self, err: ServiceError) {
        self.with(|s| s.sessions.push_back(Err(err)));
    }

    pub fn push_task(&self, task: Task) {
        self.with(|s| s.tasks.push_back(Ok(task)));
    }

    pub fn fail_task(&self, err: ServiceError) {
        self.with(|s| s.tasks.push_back(Err(err)));
    }

    pub fn push_run(&self, run: RunCodeResponse) {
        self.with(|s| s.runs.push_back(Ok(run)));
    }

    pub fn fail_run(&self, err: ServiceError) {
        self.with(|s| s.runs.push_back(Err(err)));
    }

    pub fn push_hint(&self, hint: impl Into<String>) {
        let hint = hint.into();
        self.with(|s| s.hints.push_back(Ok(HintResponse { hint })));
    }

    pub fn push_complexity(&self, resp: ComplexityResponse) {
        self.with(|s| s.complexity.push_back(Ok(resp)));
    }

    pub fn push_soft_skills(&self, comm_score: f64, feedback: impl Into<String>) {
        let feedback = feedback.into();
        self.with(|s| {
            s.soft_skills
                .push_back(Ok(SoftSkillsResponse { comm_score, feedback }))
        });
    }

    pub fn push_review(&self, resp: SubmitRoundResponse) {
        self.with(|s| s.reviews.push_back(Ok(resp)));
    }

    pub fn push_questions<I, Q>(&self, questions: I)
    where
        I: IntoIterator<Item = Q>,
        Q: Into<String>,
    {
        let questions = questions.into_iter().map(Into::into).collect();
        self.with(|s| {
            s.questions
                .push_back(Ok(InterviewQuestionsResponse { questions }))
        });
    }

    pub fn push_reaction(&self, reaction: impl Into<String>) {
        let reaction = reaction.into();
        self.with(|s| s.reactions.push_back(Ok(InterviewAnswerResponse { reaction })));
    }

    /// Queues raw results; used by the YAML scenario runner.
    pub(crate) fn script(&self, f: impl FnOnce(&mut ScriptQueues<'_>)) {
        self.with(|s| {
            let mut queues = ScriptQueues { script: s };
            f(&mut queues);
        });
    }

    /// Endpoint names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.with(|s| s.calls.clone())
    }

    pub fn run_requests(&self) -> Vec<RunCodeRequest> {
        self.with(|s| s.run_requests.clone())
    }

    pub fn submit_requests(&self) -> Vec<SubmitRoundRequest> {
        self.with(|s| s.submit_requests.clone())
    }

    pub fn answer_requests(&self) -> Vec<InterviewAnswerRequest> {
        self.with(|s| s.answer_requests.clone())
    }
}

/// Write access to the reply queues of a locked script.
pub(crate) struct ScriptQueues<'a> {
    script: &'a mut Script,
}

impl ScriptQueues<'_> {
    pub(crate) fn session(&mut self, r: ServiceResult<StartSessionResponse>) {
        self.script.sessions.push_back(r);
    }
    pub(crate) fn task(&mut self, r: ServiceResult<Task>) {
        self.script.tasks.push_back(r);
    }
    pub(crate) fn run(&mut self, r: ServiceResult<RunCodeResponse>) {
        self.script.runs.push_back(r);
    }
    pub(crate) fn hint(&mut self, r: ServiceResult<HintResponse>) {
        self.script.hints.push_back(r);
    }
    pub(crate) fn complexity(&mut self, r: ServiceResult<ComplexityResponse>) {
        self.script.complexity.push_back(r);
    }
    pub(crate) fn soft_skills(&mut self, r: ServiceResult<SoftSkillsResponse>) {
        self.script.soft_skills.push_back(r);
    }
    pub(crate) fn review(&mut self, r: ServiceResult<SubmitRoundResponse>) {
        self.script.reviews.push_back(r);
    }
    pub(crate) fn questions(&mut self, r: ServiceResult<InterviewQuestionsResponse>) {
        self.script.questions.push_back(r);
    }
    pub(crate) fn reaction(&mut self, r: ServiceResult<InterviewAnswerResponse>) {
        self.script.reactions.push_back(r);
    }
}

#[async_trait]
impl InterviewService for ScriptedService {
    async fn start_session(&self, _req: &StartSessionRequest) -> ServiceResult<StartSessionResponse> {
        self.with(|s| {
            s.calls.push("start_session");
            pop(&mut s.sessions, "start_session")
        })
    }

    async fn next_task(&self, _session_id: &str) -> ServiceResult<Task> {
        self.with(|s| {
            s.calls.push("next_task");
            pop(&mut s.tasks, "next_task")
        })
    }

    async fn run_code(&self, req: &RunCodeRequest) -> ServiceResult<RunCodeResponse> {
        self.with(|s| {
            s.calls.push("run_code");
            s.run_requests.push(req.clone());
            pop(&mut s.runs, "run_code")
        })
    }

    async fn hint(&self, _req: &HintRequest) -> ServiceResult<HintResponse> {
        self.with(|s| {
            s.calls.push("hint");
            pop(&mut s.hints, "hint")
        })
    }

    async fn check_complexity(&self, _req: &ComplexityRequest) -> ServiceResult<ComplexityResponse> {
        self.with(|s| {
            s.calls.push("check_complexity");
            pop(&mut s.complexity, "check_complexity")
        })
    }

    async fn evaluate_soft_skills(
        &self,
        _req: &SoftSkillsRequest,
    ) -> ServiceResult<SoftSkillsResponse> {
        self.with(|s| {
            s.calls.push("evaluate_soft_skills");
            pop(&mut s.soft_skills, "evaluate_soft_skills")
        })
    }

    async fn submit_round(&self, req: &SubmitRoundRequest) -> ServiceResult<SubmitRoundResponse> {
        self.with(|s| {
            s.calls.push("submit_round");
            s.submit_requests.push(req.clone());
            pop(&mut s.reviews, "submit_round")
        })
    }

    async fn interview_questions(
        &self,
        _req: &InterviewQuestionsRequest,
    ) -> ServiceResult<InterviewQuestionsResponse> {
        self.with(|s| {
            s.calls.push("interview_questions");
            pop(&mut s.questions, "interview_questions")
        })
    }

    async fn interview_answer(
        &self,
        req: &InterviewAnswerRequest,
    ) -> ServiceResult<InterviewAnswerResponse> {
        self.with(|s| {
            s.calls.push("interview_answer");
            s.answer_requests.push(req.clone());
            pop(&mut s.reactions, "interview_answer")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_served_in_order_then_error() {
        let service = ScriptedService::new();
        service.push_hint("first");
        service.push_hint("second");
        let req = HintRequest {
            session_id: "s".to_string(),
            question: "HELP".to_string(),
        };

        assert_eq!(service.hint(&req).await.unwrap().hint, "first");
        assert_eq!(service.hint(&req).await.unwrap().hint, "second");
        assert!(matches!(service.hint(&req).await, Err(ServiceError::Transport(_))));
        assert_eq!(service.calls(), vec!["hint", "hint", "hint"]);
    }

    #[tokio::test]
    async fn test_clones_share_log() {
        let service = ScriptedService::new();
        let clone = service.clone();
        let _ = clone.next_task("s").await;
        assert_eq!(service.calls(), vec!["next_task"]);
    }
}
