//! Interview session state machine.
//!
//! `Session` is the single aggregate for one interview: current stage, task,
//! attempt count, last verified code, follow-up question queue, and the
//! scoring inputs. It performs no I/O. Every trigger (candidate action or the
//! result of an external call) goes through [`Session::handle`], which
//! mutates the session and returns the effects the driver must carry out.
//!
//! At most one external call is outstanding at a time. The session records
//! which call it is waiting for and rejects user triggers until the reply
//! arrives, so stage transitions never race with service results.

use crate::command::Command;
use crate::score::{AI_PENALTY, RoundResult, ScoreBreakdown};
use std::fmt;
use tracing::{debug, info, warn};
use vibecode_proto::wire::{
    ComplexityRequest, ComplexityResponse, DEFAULT_STYLE_SCORE, HintRequest, HintResponse,
    InterviewAnswerRequest, InterviewAnswerResponse, InterviewQuestionsRequest,
    InterviewQuestionsResponse, RunCodeRequest, RunCodeResponse, SoftSkillsRequest,
    SoftSkillsResponse, StartSessionRequest, StartSessionResponse, SubmitRoundResponse, Task,
    TestSuite, Validate,
};
use vibecode_proto::{ServiceError, ServiceResult, Stage};

const GREETING: &str = "👋 Hi! Let's start the interview...";
const GENERATING_TASK: &str = "📝 Generating a task...";
const USAGE: &str = "💡 Write your code and press **Start** to run the public tests.\n\
                     💡 Need a hint? Send **HELP** followed by your question.";
const CODING_GUIDANCE: &str =
    "Use: **Start** (run tests), **HELP** (hint), **SKIP** (skip the task).";
const DONE_GUIDANCE: &str = "Send **NEXT** for the next task.";
const WAIT_GUIDANCE: &str = "⏳ Still waiting for the previous step to finish.";
const HALTED_GUIDANCE: &str = "The interview could not be started.";
const SKIP_CONTROL_GUIDANCE: &str = "Skip is only available while coding or after the round.";
const NO_TASK_GUIDANCE: &str = "No task loaded yet. Retry loading the task to continue.";
const COMPLEXITY_PROMPT: &str = "❓ **Estimate the complexity of your algorithm:**\n\
                                 For example: O(1), O(n), O(n^2), O(n log n)...";
const COMPLEXITY_GUIDANCE: &str = "Please send your complexity estimate, e.g. O(n log n).";
const EXPLANATION_PROMPT: &str = "🗣 **EXPLANATION STAGE:**\n\
                                  Interviewer: \"Briefly explain why you chose this approach. \
                                  What are its strengths?\"";
const EXPLANATION_GUIDANCE: &str = "Please explain your approach in a few sentences.";
const REVIEW_GUIDANCE: &str = "⏳ The review runs automatically, please wait.";
const ANSWER_GUIDANCE: &str = "Please answer the interviewer's question.";
const NEXT_ROUND_PROMPT: &str = "Ready for the next round? Send **NEXT**.";

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Open the interview: create a session and load the first task.
    Begin,
    /// The editor's Start control, carrying the current editor contents.
    Start { code: String },
    /// The editor's Skip control.
    SkipControl,
    /// A chat message from the candidate.
    Chat(String),
    /// Retry loading a task after a task-load failure.
    ReloadTask,
    /// Result of the outstanding external call.
    Reply(ServiceResult<Reply>),
}

/// An external call the driver must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    StartSession(StartSessionRequest),
    NextTask { session_id: String },
    RunCode(RunCodeRequest),
    Hint(HintRequest),
    CheckComplexity(ComplexityRequest),
    EvaluateSoftSkills(SoftSkillsRequest),
    /// The driver attaches the anti-cheat snapshot when it issues the call.
    SubmitRound { session_id: String, code: String },
    InterviewQuestions(InterviewQuestionsRequest),
    InterviewAnswer(InterviewAnswerRequest),
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::StartSession(_) => RequestKind::StartSession,
            Request::NextTask { .. } => RequestKind::NextTask,
            Request::RunCode(req) => RequestKind::RunCode(req.suite),
            Request::Hint(_) => RequestKind::Hint,
            Request::CheckComplexity(_) => RequestKind::CheckComplexity,
            Request::EvaluateSoftSkills(_) => RequestKind::EvaluateSoftSkills,
            Request::SubmitRound { .. } => RequestKind::SubmitRound,
            Request::InterviewQuestions(_) => RequestKind::InterviewQuestions,
            Request::InterviewAnswer(_) => RequestKind::InterviewAnswer,
        }
    }
}

/// A successful external call result.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    SessionStarted(StartSessionResponse),
    Task(Task),
    CodeRun(RunCodeResponse),
    Hint(HintResponse),
    Complexity(ComplexityResponse),
    SoftSkills(SoftSkillsResponse),
    RoundReviewed(SubmitRoundResponse),
    Questions(InterviewQuestionsResponse),
    Reaction(InterviewAnswerResponse),
}

impl Validate for Reply {
    /// Checks and normalizes the payload before any handler sees it.
    fn validate(self) -> ServiceResult<Self> {
        Ok(match self {
            Reply::SessionStarted(resp) => Reply::SessionStarted(resp.validate()?),
            Reply::Task(task) => Reply::Task(task.validate()?),
            Reply::CodeRun(run) => Reply::CodeRun(run.validate()?),
            Reply::Hint(resp) => Reply::Hint(resp.validate()?),
            Reply::Complexity(resp) => Reply::Complexity(resp.validate()?),
            Reply::SoftSkills(resp) => Reply::SoftSkills(resp.validate()?),
            Reply::RoundReviewed(resp) => Reply::RoundReviewed(resp.validate()?),
            Reply::Questions(resp) => Reply::Questions(resp.validate()?),
            Reply::Reaction(resp) => Reply::Reaction(resp.validate()?),
        })
    }
}

/// Identifies the outstanding call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    StartSession,
    NextTask,
    RunCode(TestSuite),
    Hint,
    CheckComplexity,
    EvaluateSoftSkills,
    SubmitRound,
    InterviewQuestions,
    InterviewAnswer,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::StartSession => f.write_str("start_session"),
            RequestKind::NextTask => f.write_str("next_task"),
            RequestKind::RunCode(suite) => write!(f, "run_code({})", suite.as_str()),
            RequestKind::Hint => f.write_str("hint"),
            RequestKind::CheckComplexity => f.write_str("check_complexity"),
            RequestKind::EvaluateSoftSkills => f.write_str("evaluate_soft_skills"),
            RequestKind::SubmitRound => f.write_str("submit_round"),
            RequestKind::InterviewQuestions => f.write_str("interview_questions"),
            RequestKind::InterviewAnswer => f.write_str("interview_answer"),
        }
    }
}

/// Work the driver must carry out after a transition, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a system message to the transcript.
    Say(String),
    /// Append a candidate message to the transcript.
    Echo(String),
    /// Replace the console pane.
    Console(String),
    /// Replace the editor contents (new task loaded).
    SeedEditor(String),
    /// Issue an external call and feed its result back as `Trigger::Reply`.
    Call(Request),
    /// A round ended (completed or skipped).
    RoundFinished(RoundResult),
    /// Session bootstrap failed; nothing further can happen.
    Halt(String),
}

/// The interview session aggregate.
#[derive(Debug, Clone)]
pub struct Session {
    level: String,
    topic: String,
    session_id: Option<String>,
    stage: Stage,
    attempts: u32,
    last_verified_code: String,
    current_task: Option<Task>,
    /// Code of the in-flight test run; hidden tests reuse it.
    submitted_code: String,
    questions: Vec<String>,
    question_index: usize,
    score: ScoreBreakdown,
    rounds: Vec<RoundResult>,
    pending: Option<RequestKind>,
    task_load_failed: bool,
    halted: bool,
}

impl Session {
    pub fn new(level: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            topic: topic.into(),
            session_id: None,
            stage: Stage::Coding,
            attempts: 0,
            last_verified_code: String::new(),
            current_task: None,
            submitted_code: String::new(),
            questions: Vec::new(),
            question_index: 0,
            score: ScoreBreakdown::default(),
            rounds: Vec::new(),
            pending: None,
            task_load_failed: false,
            halted: false,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_verified_code(&self) -> &str {
        &self.last_verified_code
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn score(&self) -> &ScoreBreakdown {
        &self.score
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    /// Sum of all recorded round scores.
    pub fn total_score(&self) -> u32 {
        self.rounds.iter().map(|r| r.final_score).sum()
    }

    pub fn pending(&self) -> Option<RequestKind> {
        self.pending
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Value-in/value-out form of [`Session::handle`].
    pub fn transition(mut self, trigger: Trigger) -> (Self, Vec<Effect>) {
        let effects = self.handle(trigger);
        (self, effects)
    }

    /// Applies a trigger and returns the resulting effects.
    pub fn handle(&mut self, trigger: Trigger) -> Vec<Effect> {
        let mut fx = Vec::new();
        if let Trigger::Chat(text) = &trigger {
            fx.push(Effect::Echo(text.clone()));
        }

        match trigger {
            Trigger::Reply(result) => self.on_reply(result, &mut fx),
            _ if self.halted => say(&mut fx, HALTED_GUIDANCE),
            _ if self.pending.is_some() => say(&mut fx, WAIT_GUIDANCE),
            Trigger::Begin => self.on_begin(&mut fx),
            Trigger::Start { code } => self.on_start(code, &mut fx),
            Trigger::SkipControl => self.on_skip_control(&mut fx),
            Trigger::Chat(text) => self.on_chat(&text, &mut fx),
            Trigger::ReloadTask => self.on_reload(&mut fx),
        }
        fx
    }

    // ─────────────────────────────────────────────────────────────────────────
    // USER TRIGGERS
    // ─────────────────────────────────────────────────────────────────────────

    fn on_begin(&mut self, fx: &mut Vec<Effect>) {
        if self.session_id.is_some() {
            say(fx, "The interview is already running.");
            return;
        }
        say(fx, GREETING);
        let request = StartSessionRequest {
            level: self.level.clone(),
            topic: self.topic.clone(),
        };
        self.call(Request::StartSession(request), fx);
    }

    fn on_start(&mut self, code: String, fx: &mut Vec<Effect>) {
        if self.stage != Stage::Coding {
            say(fx, format!("Start is only available while coding (current stage: {}).", self.stage));
            return;
        }
        let Some(session_id) = self.session_id.clone() else {
            say(fx, NO_TASK_GUIDANCE);
            return;
        };
        if self.current_task.is_none() {
            say(fx, NO_TASK_GUIDANCE);
            return;
        }

        self.attempts += 1;
        debug!(attempts = self.attempts, "Start: running public tests");
        self.submitted_code = code.clone();
        fx.push(Effect::Console("> 🧪 Running public tests...".to_string()));
        self.call(
            Request::RunCode(RunCodeRequest {
                session_id,
                code,
                suite: TestSuite::Public,
            }),
            fx,
        );
    }

    fn on_skip_control(&mut self, fx: &mut Vec<Effect>) {
        match self.stage {
            Stage::Coding => {
                fx.push(Effect::Echo("SKIP".to_string()));
                self.on_chat("SKIP", fx);
            }
            Stage::Done => self.request_task(fx),
            _ => say(fx, SKIP_CONTROL_GUIDANCE),
        }
    }

    fn on_reload(&mut self, fx: &mut Vec<Effect>) {
        if self.current_task.is_some() && !self.task_load_failed {
            say(fx, "A task is already loaded.");
            return;
        }
        self.request_task(fx);
    }

    fn on_chat(&mut self, text: &str, fx: &mut Vec<Effect>) {
        let text = text.trim();
        if text.is_empty() && self.stage.accepts_free_text() {
            let guidance = match self.stage {
                Stage::Complexity => COMPLEXITY_GUIDANCE,
                Stage::Explanation => EXPLANATION_GUIDANCE,
                _ => ANSWER_GUIDANCE,
            };
            say(fx, guidance);
            return;
        }

        match self.stage {
            Stage::Coding if self.current_task.is_none() => say(fx, NO_TASK_GUIDANCE),
            Stage::Coding => self.on_coding_command(Command::parse(text), fx),
            Stage::Complexity => {
                let request = ComplexityRequest {
                    code: self.last_verified_code.clone(),
                    user_estimate: text.to_string(),
                };
                self.call(Request::CheckComplexity(request), fx);
            }
            Stage::Explanation => {
                let request = SoftSkillsRequest {
                    code: self.last_verified_code.clone(),
                    explanation: text.to_string(),
                };
                self.call(Request::EvaluateSoftSkills(request), fx);
            }
            Stage::Review => say(fx, REVIEW_GUIDANCE),
            Stage::Interview => {
                let Some(question) = self.questions.get(self.question_index).cloned() else {
                    say(fx, REVIEW_GUIDANCE);
                    return;
                };
                let request = InterviewAnswerRequest {
                    question,
                    answer: text.to_string(),
                };
                self.call(Request::InterviewAnswer(request), fx);
            }
            Stage::Done => match Command::parse(text) {
                Command::Next | Command::Skip => self.request_task(fx),
                _ => say(fx, DONE_GUIDANCE),
            },
        }
    }

    fn on_coding_command(&mut self, command: Command, fx: &mut Vec<Effect>) {
        match command {
            Command::Skip if !self.last_verified_code.is_empty() => {
                say(fx, "⚠️ You chose to stop. Evaluating your last working solution...");
                self.enter_complexity(fx);
            }
            Command::Skip => {
                say(fx, "⏭️ Task skipped (no working solution). 0 points.");
                // The skipped task is written off even if the next load fails.
                let title = self.current_task.take().map(|t| t.title).unwrap_or_default();
                let result = RoundResult::skipped(title);
                info!(task = %result.task_title, "Round skipped without a verified solution");
                self.rounds.push(result.clone());
                fx.push(Effect::RoundFinished(result));
                self.request_task(fx);
            }
            Command::Help(question) => {
                let Some(session_id) = self.session_id.clone() else {
                    say(fx, CODING_GUIDANCE);
                    return;
                };
                self.call(Request::Hint(HintRequest { session_id, question }), fx);
            }
            Command::Next | Command::Text(_) => say(fx, CODING_GUIDANCE),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // REPLIES
    // ─────────────────────────────────────────────────────────────────────────

    fn on_reply(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        let Some(pending) = self.pending.take() else {
            warn!("Ignoring reply with no outstanding request");
            return;
        };

        // A reply of the wrong kind still settles the outstanding call, as a failure.
        let result = result.and_then(|reply| {
            if reply_matches(pending, &reply) {
                reply.validate()
            } else {
                Err(ServiceError::Malformed(format!("unexpected reply to {pending}")))
            }
        });
        if let Err(e) = &result {
            warn!(request = %pending, error = %e, "External call failed");
        }

        match pending {
            RequestKind::StartSession => self.on_session_started(result, fx),
            RequestKind::NextTask => self.on_task(result, fx),
            RequestKind::RunCode(TestSuite::Public) => self.on_public_run(result, fx),
            RequestKind::RunCode(TestSuite::Hidden) => self.on_hidden_run(result, fx),
            RequestKind::Hint => match result.and_then(|r| match r {
                Reply::Hint(resp) => Ok(resp),
                _ => unreachable_reply(),
            }) {
                Ok(resp) => say(fx, resp.hint),
                Err(e) => say(fx, format!("⚠️ No hint this time ({e}).")),
            },
            RequestKind::CheckComplexity => self.on_complexity(result, fx),
            RequestKind::EvaluateSoftSkills => self.on_soft_skills(result, fx),
            RequestKind::SubmitRound => self.on_round_reviewed(result, fx),
            RequestKind::InterviewQuestions => self.on_questions(result, fx),
            RequestKind::InterviewAnswer => self.on_reaction(result, fx),
        }
    }

    fn on_session_started(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        match result.and_then(|r| match r {
            Reply::SessionStarted(resp) => Ok(resp),
            _ => unreachable_reply(),
        }) {
            Ok(resp) => {
                info!(session_id = %resp.session_id, "Interview session started");
                self.session_id = Some(resp.session_id);
                self.request_task(fx);
            }
            Err(e) => {
                self.halted = true;
                let message = format!("Failed to start the interview: {e}");
                say(fx, message.clone());
                fx.push(Effect::Halt(message));
            }
        }
    }

    fn on_task(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        match result.and_then(|r| match r {
            Reply::Task(task) => Ok(task),
            _ => unreachable_reply(),
        }) {
            Ok(task) => self.load_task(task, fx),
            Err(e) => {
                self.task_load_failed = true;
                say(fx, format!("Could not load the task: {e}"));
            }
        }
    }

    fn on_public_run(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        let run = match result.and_then(into_run) {
            Ok(run) => run,
            Err(e) => {
                fx.push(Effect::Console("Network error".to_string()));
                say(fx, format!("⚠️ Could not run the code ({e}). Press Start to try again."));
                return;
            }
        };

        fx.push(Effect::Console(run.console_text()));
        if run.all_passed() {
            say(fx, "🔓 Public tests passed! Running hidden tests...");
            fx.push(Effect::Console("> 🔓 Running hidden tests...".to_string()));
            let Some(session_id) = self.session_id.clone() else {
                return;
            };
            let request = RunCodeRequest {
                session_id,
                code: self.submitted_code.clone(),
                suite: TestSuite::Hidden,
            };
            self.call(Request::RunCode(request), fx);
        } else {
            say(
                fx,
                format!(
                    "❌ Public tests: {}/{}. Fix the errors and press Start again.",
                    run.passed, run.total
                ),
            );
        }
    }

    fn on_hidden_run(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        let run = match result.and_then(into_run) {
            Ok(run) => run,
            Err(e) => {
                fx.push(Effect::Console("Network error".to_string()));
                say(fx, format!("⚠️ Hidden test verification failed ({e}). Press Start to try again."));
                return;
            }
        };

        fx.push(Effect::Console(run.console_text()));
        self.score.test_ratio = run.ratio();
        if run.all_passed() {
            say(fx, "✅ Congratulations! All tests (public + hidden) passed!");
            self.last_verified_code = std::mem::take(&mut self.submitted_code);
            self.enter_complexity(fx);
        } else {
            say(
                fx,
                format!(
                    "❌ Hidden tests: {}/{}.\n👉 Fix the code and press Start again.\n👉 Or send **SKIP** to move on.",
                    run.passed, run.total
                ),
            );
        }
    }

    fn on_complexity(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        match result {
            Ok(Reply::Complexity(resp)) if resp.is_correct => {
                self.score.complexity_ok = true;
                say(fx, format!("✅ Correct! Complexity: {}", resp.real_complexity));
            }
            Ok(Reply::Complexity(resp)) => {
                self.score.complexity_ok = false;
                say(
                    fx,
                    format!(
                        "❌ Incorrect. The AI estimates: {}\n📝 {}",
                        resp.real_complexity, resp.explanation
                    ),
                );
            }
            Ok(_) | Err(_) => {
                self.score.complexity_ok = false;
                say(fx, "⚠️ Complexity check failed. No points for this stage.");
            }
        }
        self.stage = Stage::Explanation;
        debug!(stage = %self.stage, "Stage transition");
        say(fx, EXPLANATION_PROMPT);
    }

    fn on_soft_skills(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        match result.and_then(|r| match r {
            Reply::SoftSkills(resp) => Ok(resp),
            _ => unreachable_reply(),
        }) {
            Ok(resp) => {
                self.score.soft_score = resp.comm_score;
                say(
                    fx,
                    format!(
                        "💬 Communication score: {}/100\n📝 {}",
                        resp.comm_score.round(),
                        resp.feedback
                    ),
                );
            }
            Err(_) => {
                self.score.soft_score = 0.0;
                say(fx, "⚠️ Explanation evaluation failed. Communication score set to 0.");
            }
        }
        self.enter_review(fx);
    }

    fn on_round_reviewed(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        match result.and_then(|r| match r {
            Reply::RoundReviewed(resp) => Ok(resp),
            _ => unreachable_reply(),
        }) {
            Ok(resp) => {
                let style = resp.style_score();
                self.score.style_score = style;
                say(fx, format!("📊 **Code score: {}/100**\n{}", style.round(), resp.review.feedback));

                if resp.ai_cheat_detected {
                    self.score.ai_penalty = AI_PENALTY;
                    say(
                        fx,
                        format!(
                            "⚠️ **WARNING: high probability of LLM-generated code!**\n📝 Reason: {}",
                            resp.ai_reason()
                        ),
                    );
                } else {
                    self.score.ai_penalty = 0;
                    say(fx, "✅ The code looks natural.");
                }

                let similarity = resp.similarity();
                self.score.similarity = similarity;
                say(
                    fx,
                    format!(
                        "📊 **Similarity to the reference solution: {:.0}%**",
                        similarity * 100.0
                    ),
                );
            }
            Err(_) => {
                self.score.style_score = DEFAULT_STYLE_SCORE;
                self.score.ai_penalty = 0;
                self.score.similarity = 0.0;
                say(fx, "⚠️ Code review failed. Default review scores applied.");
            }
        }
        self.enter_interview(fx);
    }

    fn on_questions(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        match result.and_then(|r| match r {
            Reply::Questions(resp) => Ok(resp),
            _ => unreachable_reply(),
        }) {
            Ok(resp) if !resp.questions.is_empty() => {
                self.questions = resp.questions;
                self.question_index = 0;
                say(
                    fx,
                    format!("🎤 **FOLLOW-UP INTERVIEW** ({} questions):", self.questions.len()),
                );
                say(fx, self.questions[0].clone());
            }
            Ok(_) => {
                say(fx, "No questions were generated. Moving on to the final score.");
                self.finish_round(fx);
            }
            Err(_) => {
                say(fx, "⚠️ Question generation failed.");
                self.finish_round(fx);
            }
        }
    }

    fn on_reaction(&mut self, result: ServiceResult<Reply>, fx: &mut Vec<Effect>) {
        match result {
            Ok(Reply::Reaction(resp)) => say(fx, resp.reaction),
            _ => say(fx, "Skipping..."),
        }

        self.question_index += 1;
        match self.questions.get(self.question_index) {
            Some(next) => say(fx, next.clone()),
            None => self.finish_round(fx),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // STAGE ENTRY
    // ─────────────────────────────────────────────────────────────────────────

    fn request_task(&mut self, fx: &mut Vec<Effect>) {
        let Some(session_id) = self.session_id.clone() else {
            say(fx, "No interview session.");
            return;
        };
        say(fx, GENERATING_TASK);
        self.call(Request::NextTask { session_id }, fx);
    }

    fn load_task(&mut self, task: Task, fx: &mut Vec<Effect>) {
        info!(title = %task.title, "Task loaded");
        self.stage = Stage::Coding;
        self.attempts = 0;
        self.last_verified_code.clear();
        self.submitted_code.clear();
        self.questions.clear();
        self.question_index = 0;
        self.score = ScoreBreakdown::default();
        self.task_load_failed = false;

        fx.push(Effect::SeedEditor(task.initial_code.clone()));
        fx.push(Effect::Console("> New task loaded.".to_string()));
        say(fx, format!("**Task: {}**\n\n{}", task.title, task.description));
        say(fx, USAGE);
        self.current_task = Some(task);
    }

    fn enter_complexity(&mut self, fx: &mut Vec<Effect>) {
        self.stage = Stage::Complexity;
        debug!(stage = %self.stage, "Stage transition");
        say(fx, COMPLEXITY_PROMPT);
    }

    fn enter_review(&mut self, fx: &mut Vec<Effect>) {
        self.stage = Stage::Review;
        debug!(stage = %self.stage, "Stage transition");
        say(fx, "⏳ The AI is running the final review and authorship check...");
        let session_id = self.session_id.clone().unwrap_or_default();
        self.call(
            Request::SubmitRound {
                session_id,
                code: self.last_verified_code.clone(),
            },
            fx,
        );
    }

    fn enter_interview(&mut self, fx: &mut Vec<Effect>) {
        self.stage = Stage::Interview;
        debug!(stage = %self.stage, "Stage transition");
        self.questions.clear();
        self.question_index = 0;
        say(fx, "💬 The interviewer is preparing questions about your solution...");
        let reference_solution = self
            .current_task
            .as_ref()
            .map(|t| t.reference_solution.clone())
            .unwrap_or_default();
        self.call(
            Request::InterviewQuestions(InterviewQuestionsRequest {
                code: self.last_verified_code.clone(),
                reference_solution,
            }),
            fx,
        );
    }

    fn finish_round(&mut self, fx: &mut Vec<Effect>) {
        self.stage = Stage::Done;
        let final_score = self.score.finalize(self.attempts);
        info!(
            total = final_score.total,
            attempts = self.attempts,
            ai_penalty = final_score.ai_penalty,
            "Round finished"
        );

        say(fx, final_score.summary());
        if final_score.ai_penalty > 0 {
            say(fx, "⚠️ (AI-generated code penalty applied)");
        }
        say(fx, NEXT_ROUND_PROMPT);

        let title = self
            .current_task
            .as_ref()
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let result = RoundResult::completed(title, final_score);
        self.rounds.push(result.clone());
        fx.push(Effect::RoundFinished(result));
    }

    fn call(&mut self, request: Request, fx: &mut Vec<Effect>) {
        let kind = request.kind();
        debug!(request = %kind, stage = %self.stage, "Issuing external call");
        self.pending = Some(kind);
        fx.push(Effect::Call(request));
    }
}

fn say(fx: &mut Vec<Effect>, text: impl Into<String>) {
    fx.push(Effect::Say(text.into()));
}

fn reply_matches(pending: RequestKind, reply: &Reply) -> bool {
    matches!(
        (pending, reply),
        (RequestKind::StartSession, Reply::SessionStarted(_))
            | (RequestKind::NextTask, Reply::Task(_))
            | (RequestKind::RunCode(_), Reply::CodeRun(_))
            | (RequestKind::Hint, Reply::Hint(_))
            | (RequestKind::CheckComplexity, Reply::Complexity(_))
            | (RequestKind::EvaluateSoftSkills, Reply::SoftSkills(_))
            | (RequestKind::SubmitRound, Reply::RoundReviewed(_))
            | (RequestKind::InterviewQuestions, Reply::Questions(_))
            | (RequestKind::InterviewAnswer, Reply::Reaction(_))
    )
}

fn into_run(reply: Reply) -> ServiceResult<RunCodeResponse> {
    match reply {
        Reply::CodeRun(run) => Ok(run),
        _ => unreachable_reply(),
    }
}

/// Kinds are checked in `on_reply`; reaching this means a handler was routed wrongly.
fn unreachable_reply<T>() -> ServiceResult<T> {
    Err(ServiceError::Malformed("reply routed to the wrong handler".to_string()))
}
