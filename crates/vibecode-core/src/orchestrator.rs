//! Async driver for the interview session.
//!
//! The orchestrator owns the transcript, console, editor buffer, and the
//! anti-cheat counter handle. It feeds triggers into the [`Session`] state
//! machine, applies the resulting effects, and performs external calls through
//! an [`InterviewService`]. Each call's result is fed straight back as the next
//! trigger, so a single user action runs to quiescence before `dispatch`
//! returns (public tests chain into hidden tests, review chains into question
//! generation, and so on).

use crate::anti_cheat::AntiCheatCounter;
use crate::score::RoundResult;
use crate::session::{Effect, Reply, Request, Session, Trigger};
use crate::transcript::Transcript;
use std::time::Instant;
use tracing::{debug, info};
use vibecode_proto::wire::SubmitRoundRequest;
use vibecode_proto::{InterviewService, ServiceResult};

/// Errors that stop the interview.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The session could not be created; no task can be loaded.
    #[error("Interview bootstrap failed: {0}")]
    Bootstrap(String),
}

type RoundObserver = Box<dyn Fn(&RoundResult) + Send + 'static>;

pub struct Orchestrator {
    service: Box<dyn InterviewService>,
    session: Session,
    transcript: Transcript,
    console: String,
    editor: String,
    anti_cheat: AntiCheatCounter,
    round_observers: Vec<RoundObserver>,
}

impl Orchestrator {
    pub fn new(service: Box<dyn InterviewService>, session: Session) -> Self {
        Self {
            service,
            session,
            transcript: Transcript::new(),
            console: String::new(),
            editor: String::new(),
            anti_cheat: AntiCheatCounter::new(),
            round_observers: Vec::new(),
        }
    }

    /// Uses an existing counter instead of a fresh one, so an external
    /// monitor can hold the other end.
    pub fn with_anti_cheat(mut self, counter: AntiCheatCounter) -> Self {
        self.anti_cheat = counter;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Mutable access for attaching observers.
    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn console(&self) -> &str {
        &self.console
    }

    pub fn editor(&self) -> &str {
        &self.editor
    }

    /// Replaces the editor contents. The next `start` submits them.
    pub fn set_editor(&mut self, code: impl Into<String>) {
        self.editor = code.into();
    }

    /// Handle for the external violation monitor.
    pub fn anti_cheat(&self) -> AntiCheatCounter {
        self.anti_cheat.clone()
    }

    pub fn rounds(&self) -> &[RoundResult] {
        self.session.rounds()
    }

    pub fn total_score(&self) -> u32 {
        self.session.total_score()
    }

    /// Adds an observer that receives every finished or skipped round.
    pub fn add_round_observer<F>(&mut self, observer: F)
    where
        F: Fn(&RoundResult) + Send + 'static,
    {
        self.round_observers.push(Box::new(observer));
    }

    /// Creates the interview session and loads the first task.
    pub async fn begin(&mut self) -> Result<(), OrchestratorError> {
        self.dispatch(Trigger::Begin).await
    }

    /// The Start control: runs the tests on the current editor contents.
    pub async fn start(&mut self) -> Result<(), OrchestratorError> {
        let code = self.editor.clone();
        self.dispatch(Trigger::Start { code }).await
    }

    /// The Skip control.
    pub async fn skip(&mut self) -> Result<(), OrchestratorError> {
        self.dispatch(Trigger::SkipControl).await
    }

    /// A candidate chat message.
    pub async fn chat(&mut self, text: impl Into<String>) -> Result<(), OrchestratorError> {
        self.dispatch(Trigger::Chat(text.into())).await
    }

    /// Retries loading a task after a task-load failure.
    pub async fn reload_task(&mut self) -> Result<(), OrchestratorError> {
        self.dispatch(Trigger::ReloadTask).await
    }

    /// Applies a trigger and every follow-up reply until no call is outstanding.
    pub async fn dispatch(&mut self, trigger: Trigger) -> Result<(), OrchestratorError> {
        let mut next = Some(trigger);
        let mut halted = None;

        while let Some(trigger) = next.take() {
            for effect in self.session.handle(trigger) {
                match effect {
                    Effect::Call(request) => {
                        let result = self.execute(request).await;
                        next = Some(Trigger::Reply(result));
                    }
                    Effect::Halt(reason) => halted = Some(reason),
                    other => self.apply(other),
                }
            }
        }

        match halted {
            Some(reason) => Err(OrchestratorError::Bootstrap(reason)),
            None => Ok(()),
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Say(text) => {
                self.transcript.system(text);
            }
            Effect::Echo(text) => {
                self.transcript.candidate(text);
            }
            Effect::Console(text) => self.console = text,
            Effect::SeedEditor(code) => self.editor = code,
            Effect::RoundFinished(result) => {
                for observer in &self.round_observers {
                    observer(&result);
                }
            }
            Effect::Call(_) | Effect::Halt(_) => {}
        }
    }

    async fn execute(&self, request: Request) -> ServiceResult<Reply> {
        let kind = request.kind();
        let started = Instant::now();
        let service = self.service.as_ref();

        let result = match request {
            Request::StartSession(req) => service.start_session(&req).await.map(Reply::SessionStarted),
            Request::NextTask { session_id } => service.next_task(&session_id).await.map(Reply::Task),
            Request::RunCode(req) => service.run_code(&req).await.map(Reply::CodeRun),
            Request::Hint(req) => service.hint(&req).await.map(Reply::Hint),
            Request::CheckComplexity(req) => {
                service.check_complexity(&req).await.map(Reply::Complexity)
            }
            Request::EvaluateSoftSkills(req) => {
                service.evaluate_soft_skills(&req).await.map(Reply::SoftSkills)
            }
            Request::SubmitRound { session_id, code } => {
                let stats = self.anti_cheat.snapshot();
                info!(
                    violations = stats.total_violations(),
                    "Submitting round for review"
                );
                let req = SubmitRoundRequest {
                    session_id,
                    code,
                    anti_cheat_stats: stats.report(),
                };
                service.submit_round(&req).await.map(Reply::RoundReviewed)
            }
            Request::InterviewQuestions(req) => {
                service.interview_questions(&req).await.map(Reply::Questions)
            }
            Request::InterviewAnswer(req) => {
                service.interview_answer(&req).await.map(Reply::Reaction)
            }
        };

        debug!(
            request = %kind,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "External call completed"
        );
        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("session", &self.session)
            .field("transcript", &self.transcript)
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedService, fixtures};
    use vibecode_proto::{ServiceError, Stage};

    fn orchestrator(service: &ScriptedService) -> Orchestrator {
        Orchestrator::new(Box::new(service.clone()), Session::new("Middle", "Algorithms"))
    }

    #[tokio::test]
    async fn test_begin_loads_first_task_into_editor() {
        let service = ScriptedService::new();
        service.push_session(fixtures::session_started());
        service.push_task(fixtures::task());

        let mut orch = orchestrator(&service);
        orch.begin().await.unwrap();

        assert_eq!(orch.editor(), "def solution(nums):\n    pass");
        assert_eq!(orch.console(), "> New task loaded.");
        assert!(orch.transcript().entries().iter().any(|e| e.text.contains("Two Sum")));
    }

    #[tokio::test]
    async fn test_begin_failure_is_bootstrap_error() {
        let service = ScriptedService::new();
        service.fail_session(ServiceError::Transport("connection refused".to_string()));

        let mut orch = orchestrator(&service);
        let err = orch.begin().await.unwrap_err();

        assert!(matches!(err, OrchestratorError::Bootstrap(_)));
        assert!(orch.session().is_halted());
        assert_eq!(service.calls(), vec!["start_session"]);
    }

    #[tokio::test]
    async fn test_start_chains_public_into_hidden() {
        let service = ScriptedService::new();
        service.push_session(fixtures::session_started());
        service.push_task(fixtures::task());
        service.push_run(fixtures::run(2, 2));
        service.push_run(fixtures::run(3, 3));

        let mut orch = orchestrator(&service);
        orch.begin().await.unwrap();
        orch.set_editor("def solution(nums): return []");
        orch.start().await.unwrap();

        assert_eq!(orch.session().stage(), Stage::Complexity);
        assert_eq!(orch.console(), "\n\nPassed: 3/3");
        let runs = service.run_requests();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].code, runs[1].code);
    }

    #[tokio::test]
    async fn test_submit_round_carries_anti_cheat_snapshot() {
        let service = ScriptedService::new();
        service.push_session(fixtures::session_started());
        service.push_task(fixtures::task());
        service.push_run(fixtures::run(1, 1));
        service.push_run(fixtures::run(1, 1));
        service.push_complexity(fixtures::complexity(true));
        service.push_soft_skills(50.0, "ok");

        let mut orch = orchestrator(&service);
        let monitor = orch.anti_cheat();
        orch.begin().await.unwrap();
        orch.start().await.unwrap();
        monitor.record_blur();
        monitor.record_editor_paste();
        orch.chat("O(n)").await.unwrap();
        orch.chat("one pass with a map").await.unwrap();

        let submitted = service.submit_requests();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].anti_cheat_stats.blur_count, 1);
        assert_eq!(submitted[0].anti_cheat_stats.editor_paste_count, 1);
        assert_eq!(submitted[0].anti_cheat_stats.copy_count, 0);
    }

    #[tokio::test]
    async fn test_round_observer_sees_skipped_round() {
        let service = ScriptedService::new();
        service.push_session(fixtures::session_started());
        service.push_task(fixtures::task());
        service.push_task(fixtures::task());

        let mut orch = orchestrator(&service);
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&seen);
        orch.add_round_observer(move |r| sink.lock().unwrap().push(r.clone()));

        orch.begin().await.unwrap();
        orch.skip().await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].skipped);
        assert_eq!(orch.total_score(), 0);
    }
}
