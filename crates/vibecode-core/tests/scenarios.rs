//! YAML scenario tests for full interview rounds.
//!
//! Each file under `tests/scenarios/` scripts the service replies, the
//! candidate's actions, and the expected end state.

use serde::Deserialize;
use std::fs;
use vibecode_core::testing::{Scenario, ScenarioRunner};
use vibecode_proto::Stage;

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(flatten)]
    scenario: Scenario,
    expected: ExpectedYaml,
}

#[derive(Debug, Deserialize)]
struct ExpectedYaml {
    stage: Stage,
    attempts: u32,
    total_score: u32,
    round_scores: Vec<u32>,
    errors: usize,
    #[serde(default)]
    transcript_contains: Vec<String>,
    #[serde(default)]
    transcript_excludes: Vec<String>,
}

fn load_scenario(path: &str) -> ScenarioFile {
    let content =
        fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    serde_yaml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e))
}

async fn run_scenario(file: ScenarioFile) {
    let name = file.scenario.name.clone();
    let expected = file.expected;
    let trace = ScenarioRunner::new().run(&file.scenario).await;

    assert_eq!(trace.stage, expected.stage, "{}: stage", name);
    assert_eq!(trace.attempts, expected.attempts, "{}: attempts", name);
    assert_eq!(trace.total_score, expected.total_score, "{}: total score", name);
    let round_scores: Vec<u32> = trace.rounds.iter().map(|r| r.final_score).collect();
    assert_eq!(round_scores, expected.round_scores, "{}: round scores", name);
    assert_eq!(trace.errors.len(), expected.errors, "{}: errors {:?}", name, trace.errors);

    for needle in &expected.transcript_contains {
        assert!(
            trace.transcript_contains(needle),
            "{}: transcript should contain {:?}\n{:#?}",
            name,
            needle,
            trace.transcript
        );
    }
    for needle in &expected.transcript_excludes {
        assert!(
            !trace.transcript_contains(needle),
            "{}: transcript should not contain {:?}",
            name,
            needle
        );
    }

    println!("✓ {} passed", file.scenario.description);
}

#[tokio::test]
async fn test_full_round() {
    run_scenario(load_scenario("tests/scenarios/full_round.yml")).await;
}

#[tokio::test]
async fn test_all_failures() {
    run_scenario(load_scenario("tests/scenarios/all_failures.yml")).await;
}

#[tokio::test]
async fn test_ai_penalty() {
    run_scenario(load_scenario("tests/scenarios/ai_penalty.yml")).await;
}

#[tokio::test]
async fn test_skip_then_next() {
    run_scenario(load_scenario("tests/scenarios/skip_then_next.yml")).await;
}

#[tokio::test]
async fn test_bootstrap_failure() {
    run_scenario(load_scenario("tests/scenarios/bootstrap_failure.yml")).await;
}
