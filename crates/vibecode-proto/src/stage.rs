//! Interview stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One phase of the interview state machine.
///
/// Stages are ordered: a round always moves forward through them and only
/// returns to `Coding` when the next task is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Candidate writes code and runs tests.
    #[default]
    Coding,
    /// Candidate estimates the complexity of the verified solution.
    Complexity,
    /// Candidate explains the chosen approach.
    Explanation,
    /// Combined code review, AI-authorship check, and similarity scoring.
    Review,
    /// Follow-up question and answer.
    Interview,
    /// Round finished, final score posted.
    Done,
}

impl Stage {
    /// Returns the stage name as used in logs and recordings.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Coding => "coding",
            Stage::Complexity => "complexity",
            Stage::Explanation => "explanation",
            Stage::Review => "review",
            Stage::Interview => "interview",
            Stage::Done => "done",
        }
    }

    /// Returns true if the stage treats any non-empty chat text as the answer.
    pub fn accepts_free_text(self) -> bool {
        matches!(self, Stage::Complexity | Stage::Explanation | Stage::Interview)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
