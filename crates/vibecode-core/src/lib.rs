//! # vibecode-core
//!
//! Core orchestration for the Vibecode interviewer.
//!
//! This crate provides:
//! - The interview `Session` state machine (pure, no I/O)
//! - The async `Orchestrator` that drives it against an `InterviewService`
//! - Transcript, anti-cheat counters, and the scoring model
//! - Configuration loading
//! - JSONL transcript recording and reading

mod anti_cheat;
mod command;
mod config;
mod orchestrator;
mod score;
mod session;
mod session_recorder;
pub mod testing;
mod transcript;
mod transcript_reader;

pub use anti_cheat::AntiCheatCounter;
pub use command::Command;
pub use config::{ApiConfig, ConfigError, ConfigWarning, InterviewConfig, RecordingConfig, SessionConfig};
pub use orchestrator::{Orchestrator, OrchestratorError};
pub use score::{FinalScore, RoundResult, ScoreBreakdown, AI_PENALTY};
pub use session::{Effect, Reply, Request, RequestKind, Session, Trigger};
pub use session_recorder::{Record, SessionRecorder};
pub use transcript::Transcript;
pub use transcript_reader::{MalformedLine, ReadResult, RecordedEntry, TranscriptReader};
