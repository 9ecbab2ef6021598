//! Test scenario definitions and execution.
//!
//! A scenario scripts every service reply up front, then drives an
//! [`Orchestrator`] through a list of candidate actions. Scenarios are plain
//! serde types so they can live in YAML files next to the integration tests.

use super::scripted_service::ScriptedService;
use crate::orchestrator::Orchestrator;
use crate::score::RoundResult;
use crate::session::Session;
use serde::Deserialize;
use vibecode_proto::wire::{
    ComplexityResponse, HintResponse, InterviewAnswerResponse, InterviewQuestionsResponse,
    RunCodeResponse, SoftSkillsResponse, StartSessionResponse, SubmitRoundResponse, Task,
};
use vibecode_proto::{ServiceError, ServiceResult, Stage, TranscriptEntry};

/// A scripted reply: either a response body or `{error: "..."}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScriptedReply<T> {
    Failure { error: String },
    Success(T),
}

impl<T> ScriptedReply<T> {
    fn into_result(self) -> ServiceResult<T> {
        match self {
            ScriptedReply::Failure { error } => Err(ServiceError::Transport(error)),
            ScriptedReply::Success(value) => Ok(value),
        }
    }
}

/// Per-endpoint reply queues.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioReplies {
    pub session: Vec<ScriptedReply<StartSessionResponse>>,
    pub task: Vec<ScriptedReply<Task>>,
    pub run: Vec<ScriptedReply<RunCodeResponse>>,
    pub hint: Vec<ScriptedReply<HintResponse>>,
    pub complexity: Vec<ScriptedReply<ComplexityResponse>>,
    pub soft_skills: Vec<ScriptedReply<SoftSkillsResponse>>,
    pub review: Vec<ScriptedReply<SubmitRoundResponse>>,
    pub questions: Vec<ScriptedReply<InterviewQuestionsResponse>>,
    pub reaction: Vec<ScriptedReply<InterviewAnswerResponse>>,
}

/// One candidate action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    Begin,
    Edit { code: String },
    Start,
    Skip,
    Chat { text: String },
    Reload,
    Blur,
    Copy,
    Paste,
}

/// A test scenario definition.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub replies: ScenarioReplies,
    pub steps: Vec<ScenarioStep>,
}

fn default_level() -> String {
    "Middle".to_string()
}

fn default_topic() -> String {
    "Algorithms".to_string()
}

impl Scenario {
    /// Creates an empty scenario with default level and topic.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            level: default_level(),
            topic: default_topic(),
            replies: ScenarioReplies::default(),
            steps: Vec::new(),
        }
    }

    pub fn with_replies(mut self, replies: ScenarioReplies) -> Self {
        self.replies = replies;
        self
    }

    pub fn with_steps(mut self, steps: Vec<ScenarioStep>) -> Self {
        self.steps = steps;
        self
    }
}

/// Executes scenarios against a [`ScriptedService`].
#[derive(Debug, Default)]
pub struct ScenarioRunner;

impl ScenarioRunner {
    pub fn new() -> Self {
        Self
    }

    /// Runs every step and returns the resulting trace.
    pub async fn run(&self, scenario: &Scenario) -> ExecutionTrace {
        let service = ScriptedService::new();
        let replies = scenario.replies.clone();
        service.script(|q| {
            replies.session.into_iter().for_each(|r| q.session(r.into_result()));
            replies.task.into_iter().for_each(|r| q.task(r.into_result()));
            replies.run.into_iter().for_each(|r| q.run(r.into_result()));
            replies.hint.into_iter().for_each(|r| q.hint(r.into_result()));
            replies.complexity.into_iter().for_each(|r| q.complexity(r.into_result()));
            replies.soft_skills.into_iter().for_each(|r| q.soft_skills(r.into_result()));
            replies.review.into_iter().for_each(|r| q.review(r.into_result()));
            replies.questions.into_iter().for_each(|r| q.questions(r.into_result()));
            replies.reaction.into_iter().for_each(|r| q.reaction(r.into_result()));
        });

        let session = Session::new(scenario.level.clone(), scenario.topic.clone());
        let mut orch = Orchestrator::new(Box::new(service.clone()), session);
        let monitor = orch.anti_cheat();
        let mut errors = Vec::new();

        for step in &scenario.steps {
            let result = match step {
                ScenarioStep::Begin => orch.begin().await,
                ScenarioStep::Edit { code } => {
                    orch.set_editor(code.clone());
                    Ok(())
                }
                ScenarioStep::Start => orch.start().await,
                ScenarioStep::Skip => orch.skip().await,
                ScenarioStep::Chat { text } => orch.chat(text.clone()).await,
                ScenarioStep::Reload => orch.reload_task().await,
                ScenarioStep::Blur => {
                    monitor.record_blur();
                    Ok(())
                }
                ScenarioStep::Copy => {
                    monitor.record_copy();
                    Ok(())
                }
                ScenarioStep::Paste => {
                    monitor.record_editor_paste();
                    Ok(())
                }
            };
            if let Err(e) = result {
                errors.push(e.to_string());
            }
        }

        ExecutionTrace {
            stage: orch.session().stage(),
            attempts: orch.session().attempts(),
            rounds: orch.rounds().to_vec(),
            total_score: orch.total_score(),
            transcript: orch.transcript().entries().to_vec(),
            console: orch.console().to_string(),
            calls: service.calls(),
            errors,
            service,
        }
    }
}

/// Trace of a scenario execution.
#[derive(Debug)]
pub struct ExecutionTrace {
    pub stage: Stage,
    pub attempts: u32,
    pub rounds: Vec<RoundResult>,
    pub total_score: u32,
    pub transcript: Vec<TranscriptEntry>,
    pub console: String,
    pub calls: Vec<&'static str>,
    /// Orchestrator errors, one per failed step.
    pub errors: Vec<String>,
    /// The service the scenario ran against, for request inspection.
    pub service: ScriptedService,
}

impl ExecutionTrace {
    /// True when any transcript entry contains the needle.
    pub fn transcript_contains(&self, needle: &str) -> bool {
        self.transcript.iter().any(|e| e.text.contains(needle))
    }
}
