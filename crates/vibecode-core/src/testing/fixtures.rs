//! Canned service responses shared by unit and integration tests.

use vibecode_proto::wire::{ComplexityResponse, RunCodeResponse, StartSessionResponse, Task};

pub fn session_started() -> StartSessionResponse {
    StartSessionResponse {
        session_id: "sess-1".to_string(),
        message: "Session created".to_string(),
    }
}

pub fn task() -> Task {
    Task {
        title: "Two Sum".to_string(),
        description: "Return the indices of two numbers that add up to the target.".to_string(),
        initial_code: "def solution(nums):\n    pass".to_string(),
        reference_solution: "def solution(nums): ...".to_string(),
        test_cases: serde_json::json!([{"input": "[2, 7], 9", "expected": "[0, 1]"}]),
    }
}

/// A test run with no logs.
pub fn run(passed: u32, total: u32) -> RunCodeResponse {
    RunCodeResponse {
        status: if passed == total { "success" } else { "failed" }.to_string(),
        passed,
        total,
        logs: Vec::new(),
    }
}

pub fn complexity(is_correct: bool) -> ComplexityResponse {
    ComplexityResponse {
        is_correct,
        real_complexity: "O(n)".to_string(),
        explanation: "Single pass over the input with constant-time lookups.".to_string(),
    }
}
