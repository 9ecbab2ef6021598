//! Testing utilities for deterministic interview tests.

pub mod fixtures;
pub mod scenario;
pub mod scripted_service;

pub use scenario::{ExecutionTrace, Scenario, ScenarioRunner, ScenarioStep, ScriptedReply};
pub use scripted_service::ScriptedService;
