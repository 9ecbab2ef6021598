//! Request and response schemas for the external interview services.
//!
//! All services speak JSON over a single base endpoint. Response types are
//! lenient on parse (missing optional fields get documented defaults) and
//! strict on contract: call [`Validate::validate`] before a response reaches
//! scoring.

use crate::anti_cheat::AntiCheatReport;
use crate::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

/// Review score used when the reviewer omits one or the review call fails.
pub const DEFAULT_STYLE_SCORE: f64 = 70.0;

/// Contract checks applied to a decoded response.
pub trait Validate: Sized {
    /// Normalizes the response, or rejects it as malformed.
    fn validate(self) -> ServiceResult<Self>;
}

fn finite_clamped(field: &str, value: f64, lo: f64, hi: f64) -> ServiceResult<f64> {
    if value.is_finite() {
        Ok(value.clamp(lo, hi))
    } else {
        Err(ServiceError::Malformed(format!("{field} is not a finite number")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SESSION AND TASKS
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub level: String,
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

impl Validate for StartSessionResponse {
    fn validate(self) -> ServiceResult<Self> {
        if self.session_id.trim().is_empty() {
            return Err(ServiceError::Malformed("session_id is empty".to_string()));
        }
        Ok(self)
    }
}

/// A task definition for one round. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub initial_code: String,
    #[serde(default)]
    pub reference_solution: String,
    /// Opaque to the orchestrator; only the executor interprets test cases.
    #[serde(default)]
    pub test_cases: serde_json::Value,
}

impl Validate for Task {
    fn validate(self) -> ServiceResult<Self> {
        if self.title.trim().is_empty() {
            return Err(ServiceError::Malformed("task title is empty".to_string()));
        }
        Ok(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CODE EXECUTION
// ─────────────────────────────────────────────────────────────────────────────

/// Which test subset the executor should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestSuite {
    Public,
    Hidden,
}

impl TestSuite {
    pub fn as_str(self) -> &'static str {
        match self {
            TestSuite::Public => "public",
            TestSuite::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunCodeRequest {
    pub session_id: String,
    pub code: String,
    #[serde(rename = "type")]
    pub suite: TestSuite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCodeResponse {
    #[serde(default)]
    pub status: String,
    pub passed: u32,
    pub total: u32,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl RunCodeResponse {
    /// True when every test in the run passed (vacuously true for an empty run).
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Pass fraction, `1.0` when no tests ran.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            f64::from(self.passed) / f64::from(self.total)
        }
    }

    /// Console rendering: the run logs followed by the pass count.
    pub fn console_text(&self) -> String {
        format!("{}\n\nPassed: {}/{}", self.logs.join("\n"), self.passed, self.total)
    }
}

impl Validate for RunCodeResponse {
    fn validate(self) -> ServiceResult<Self> {
        if self.passed > self.total {
            return Err(ServiceError::Malformed(format!(
                "passed ({}) exceeds total ({})",
                self.passed, self.total
            )));
        }
        Ok(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GRADING SERVICES
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintRequest {
    pub session_id: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintResponse {
    pub hint: String,
}

impl Validate for HintResponse {
    fn validate(self) -> ServiceResult<Self> {
        if self.hint.trim().is_empty() {
            return Err(ServiceError::Malformed("empty hint".to_string()));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityRequest {
    pub code: String,
    pub user_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityResponse {
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default = "unknown_complexity")]
    pub real_complexity: String,
    #[serde(default)]
    pub explanation: String,
}

fn unknown_complexity() -> String {
    "Unknown".to_string()
}

impl Validate for ComplexityResponse {
    fn validate(mut self) -> ServiceResult<Self> {
        let trimmed = self.real_complexity.trim();
        self.real_complexity = if trimmed.is_empty() {
            unknown_complexity()
        } else {
            trimmed.to_string()
        };
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftSkillsRequest {
    pub code: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftSkillsResponse {
    #[serde(default)]
    pub comm_score: f64,
    #[serde(default)]
    pub feedback: String,
}

impl Validate for SoftSkillsResponse {
    fn validate(mut self) -> ServiceResult<Self> {
        self.comm_score = finite_clamped("comm_score", self.comm_score, 0.0, 100.0)?;
        Ok(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ROUND SUBMISSION (combined review / AI detection / similarity)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRoundRequest {
    pub session_id: String,
    pub code: String,
    pub anti_cheat_stats: AntiCheatReport,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeReview {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiCheck {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubmitRoundResponse {
    #[serde(default)]
    pub review: CodeReview,
    #[serde(default)]
    pub ai_cheat_detected: bool,
    #[serde(default)]
    pub ai_check: AiCheck,
    #[serde(default)]
    pub similarity: Option<f64>,
}

impl SubmitRoundResponse {
    /// Review score in `[0,100]`, defaulting when the reviewer gave none.
    pub fn style_score(&self) -> f64 {
        self.review.score.unwrap_or(DEFAULT_STYLE_SCORE)
    }

    /// Similarity in `[0,1]`, zero when absent.
    pub fn similarity(&self) -> f64 {
        self.similarity.unwrap_or(0.0)
    }

    pub fn ai_reason(&self) -> &str {
        match self.ai_check.reason.as_deref() {
            Some(reason) if !reason.trim().is_empty() => reason,
            _ => "not specified",
        }
    }
}

impl Validate for SubmitRoundResponse {
    fn validate(mut self) -> ServiceResult<Self> {
        if let Some(score) = self.review.score {
            self.review.score = Some(finite_clamped("review.score", score, 0.0, 100.0)?);
        }
        if let Some(similarity) = self.similarity {
            self.similarity = Some(finite_clamped("similarity", similarity, 0.0, 1.0)?);
        }
        Ok(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FOLLOW-UP INTERVIEW
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestionsRequest {
    pub code: String,
    pub reference_solution: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterviewQuestionsResponse {
    #[serde(default)]
    pub questions: Vec<String>,
}

impl Validate for InterviewQuestionsResponse {
    fn validate(mut self) -> ServiceResult<Self> {
        self.questions.retain(|q| !q.trim().is_empty());
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewAnswerRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewAnswerResponse {
    pub reaction: String,
}

impl Validate for InterviewAnswerResponse {
    fn validate(self) -> ServiceResult<Self> {
        if self.reaction.trim().is_empty() {
            return Err(ServiceError::Malformed("empty reaction".to_string()));
        }
        Ok(self)
    }
}
