//! Scoring model.
//!
//! Five earned components and two penalties, each owned by a different
//! stage. The final score is a pure function of the breakdown plus the
//! attempt count:
//!
//! ```text
//! raw   = 40*testRatio + 20*similarity + (complexityOk ? 10 : 0)
//!       + 15*styleScore/100 + 15*softScore/100
//! final = round(max(0, raw - max(0, (attempts-1)*2) - aiPenalty))
//! ```
//!
//! There is no upper clamp: the components cannot exceed 100 before
//! penalties anyway.

use serde::{Deserialize, Serialize};
use vibecode_proto::wire::DEFAULT_STYLE_SCORE;

/// Penalty applied when the reviewer flags likely AI-generated code.
pub const AI_PENALTY: u32 = 50;

const TEST_WEIGHT: f64 = 40.0;
const SIMILARITY_WEIGHT: f64 = 20.0;
const COMPLEXITY_POINTS: u32 = 10;
const STYLE_WEIGHT: f64 = 15.0;
const SOFT_WEIGHT: f64 = 15.0;
const ATTEMPT_PENALTY_STEP: u32 = 2;

/// Scoring inputs for one round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Hidden-test pass fraction in `[0,1]`.
    pub test_ratio: f64,
    /// Similarity to the reference solution in `[0,1]`.
    pub similarity: f64,
    pub complexity_ok: bool,
    /// Code review score in `[0,100]`.
    pub style_score: f64,
    /// Communication score in `[0,100]`.
    pub soft_score: f64,
    /// Either `0` or [`AI_PENALTY`].
    pub ai_penalty: u32,
}

impl Default for ScoreBreakdown {
    fn default() -> Self {
        Self {
            test_ratio: 1.0,
            similarity: 0.0,
            complexity_ok: false,
            style_score: DEFAULT_STYLE_SCORE,
            soft_score: 0.0,
            ai_penalty: 0,
        }
    }
}

impl ScoreBreakdown {
    pub fn attempt_penalty(attempts: u32) -> u32 {
        attempts.saturating_sub(1).saturating_mul(ATTEMPT_PENALTY_STEP)
    }

    fn test_points(&self) -> f64 {
        TEST_WEIGHT * self.test_ratio
    }

    fn similarity_points(&self) -> f64 {
        SIMILARITY_WEIGHT * self.similarity
    }

    fn complexity_points(&self) -> u32 {
        if self.complexity_ok { COMPLEXITY_POINTS } else { 0 }
    }

    fn style_points(&self) -> f64 {
        STYLE_WEIGHT * self.style_score / 100.0
    }

    fn soft_points(&self) -> f64 {
        SOFT_WEIGHT * self.soft_score / 100.0
    }

    /// Sum of earned points before penalties and before rounding.
    pub fn raw_points(&self) -> f64 {
        self.test_points()
            + self.similarity_points()
            + f64::from(self.complexity_points())
            + self.style_points()
            + self.soft_points()
    }

    /// Computes the final score. Rounding happens once, on the fully
    /// penalized total; the per-component values are rounded for display only.
    pub fn finalize(&self, attempts: u32) -> FinalScore {
        let attempt_penalty = Self::attempt_penalty(attempts);
        let net = self.raw_points() - f64::from(attempt_penalty) - f64::from(self.ai_penalty);
        let total = net.max(0.0).round() as u32;

        FinalScore {
            test_points: self.test_points().round() as u32,
            similarity_points: self.similarity_points().round() as u32,
            complexity_points: self.complexity_points(),
            style_points: self.style_points().round() as u32,
            soft_points: self.soft_points().round() as u32,
            attempt_penalty,
            ai_penalty: self.ai_penalty,
            total,
        }
    }
}

/// Rounded breakdown and total, as shown to the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub test_points: u32,
    pub similarity_points: u32,
    pub complexity_points: u32,
    pub style_points: u32,
    pub soft_points: u32,
    pub attempt_penalty: u32,
    pub ai_penalty: u32,
    pub total: u32,
}

impl FinalScore {
    /// Multi-line summary posted to the transcript when a round ends.
    pub fn summary(&self) -> String {
        format!(
            "🏆 FINAL SCORE: {}/100\n\n\
             Details:\n\
             - Tests: {} / 40\n\
             - Similarity: {} / 20\n\
             - Big O: {} / 10\n\
             - Style: {} / 15\n\
             - Soft skills: {} / 15\n\
             - Penalty (attempts): -{}\n\
             - Penalty (AI): -{}",
            self.total,
            self.test_points,
            self.similarity_points,
            self.complexity_points,
            self.style_points,
            self.soft_points,
            self.attempt_penalty,
            self.ai_penalty
        )
    }
}

/// Outcome of one finished or skipped round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub task_title: String,
    pub final_score: u32,
    pub skipped: bool,
    /// Present only for rounds that reached `done`.
    pub score: Option<FinalScore>,
}

impl RoundResult {
    pub fn skipped(task_title: impl Into<String>) -> Self {
        Self {
            task_title: task_title.into(),
            final_score: 0,
            skipped: true,
            score: None,
        }
    }

    pub fn completed(task_title: impl Into<String>, score: FinalScore) -> Self {
        Self {
            task_title: task_title.into(),
            final_score: score.total,
            skipped: false,
            score: Some(score),
        }
    }
}
