//! # vibecode-proto
//!
//! Shared types, error definitions, and traits for the Vibecode interviewer.
//!
//! This crate provides the foundational abstractions used across all Vibecode
//! crates, including:
//! - The interview `Stage` enum and transcript entry types
//! - Anti-cheat violation statistics
//! - Request/response schemas for every external interview service
//! - The `InterviewService` trait the orchestrator drives

mod anti_cheat;
mod error;
mod service;
mod stage;
mod transcript;
pub mod wire;

pub use anti_cheat::{AntiCheatReport, AntiCheatStats};
pub use error::{ServiceError, ServiceResult};
pub use service::InterviewService;
pub use stage::Stage;
pub use transcript::{Author, TranscriptEntry};
