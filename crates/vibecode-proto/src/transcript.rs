//! Transcript entry types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// The interviewer (orchestrator and the services it relays).
    System,
    /// The person being interviewed.
    Candidate,
}

impl Author {
    pub fn as_str(self) -> &'static str {
        match self {
            Author::System => "system",
            Author::Candidate => "candidate",
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in the interview chat.
///
/// Entries are immutable once appended; `id` is assigned by the transcript in
/// append order and is unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: u64,
    pub author: Author,
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(id: u64, author: Author, text: impl Into<String>) -> Self {
        Self {
            id,
            author,
            text: text.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.author == Author::System
    }
}
