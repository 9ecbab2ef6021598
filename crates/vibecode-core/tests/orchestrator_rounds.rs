//! Multi-round orchestrator tests against the scripted service.

use std::sync::Arc;
use vibecode_core::testing::{ScriptedService, fixtures};
use vibecode_core::{Orchestrator, Record, Session, SessionRecorder, TranscriptReader};
use vibecode_proto::wire::{CodeReview, SubmitRoundResponse};
use vibecode_proto::{Author, ServiceError, Stage};

fn review(score: f64, similarity: f64) -> SubmitRoundResponse {
    SubmitRoundResponse {
        review: CodeReview {
            score: Some(score),
            feedback: "ok".to_string(),
        },
        similarity: Some(similarity),
        ..SubmitRoundResponse::default()
    }
}

/// Scripts one passing round with no follow-up questions.
fn script_round(service: &ScriptedService) {
    service.push_task(fixtures::task());
    service.push_run(fixtures::run(2, 2));
    service.push_run(fixtures::run(4, 4));
    service.push_complexity(fixtures::complexity(true));
    service.push_soft_skills(100.0, "great");
    service.push_review(review(100.0, 1.0));
    service.push_questions(Vec::<String>::new());
}

async fn play_round(orch: &mut Orchestrator) {
    orch.start().await.unwrap();
    orch.chat("O(n)").await.unwrap();
    orch.chat("Because it is linear.").await.unwrap();
}

#[tokio::test]
async fn test_rounds_accumulate_total() {
    let service = ScriptedService::new();
    service.push_session(fixtures::session_started());
    script_round(&service);
    script_round(&service);

    let mut orch = Orchestrator::new(Box::new(service.clone()), Session::new("Middle", "Algorithms"));
    orch.begin().await.unwrap();
    play_round(&mut orch).await;
    assert_eq!(orch.session().stage(), Stage::Done);

    orch.chat("next").await.unwrap();
    assert_eq!(orch.session().stage(), Stage::Coding);
    assert_eq!(orch.session().attempts(), 0);
    play_round(&mut orch).await;

    let scores: Vec<u32> = orch.rounds().iter().map(|r| r.final_score).collect();
    assert_eq!(scores, vec![100, 100]);
    assert_eq!(orch.total_score(), 200);
}

#[tokio::test]
async fn test_hint_and_failed_hidden_run_keep_coding() {
    let service = ScriptedService::new();
    service.push_session(fixtures::session_started());
    service.push_task(fixtures::task());
    service.push_hint("Try a dictionary.");
    service.push_run(fixtures::run(2, 2));
    service.fail_run(ServiceError::Status {
        status: 502,
        body: "bad gateway".to_string(),
    });

    let mut orch = Orchestrator::new(Box::new(service.clone()), Session::new("Middle", "Algorithms"));
    orch.begin().await.unwrap();
    orch.chat("HELP which structure?").await.unwrap();
    orch.start().await.unwrap();

    assert_eq!(orch.session().stage(), Stage::Coding);
    assert_eq!(orch.session().attempts(), 1);
    assert_eq!(orch.console(), "Network error");
    assert!(
        orch.transcript()
            .entries()
            .iter()
            .any(|e| e.text == "Try a dictionary.")
    );
    assert_eq!(
        service.calls(),
        vec!["start_session", "next_task", "hint", "run_code", "run_code"]
    );
}

#[tokio::test]
async fn test_task_load_failure_then_retry() {
    let service = ScriptedService::new();
    service.push_session(fixtures::session_started());
    service.fail_task(ServiceError::Decode("unexpected end of input".to_string()));
    service.push_task(fixtures::task());

    let mut orch = Orchestrator::new(Box::new(service.clone()), Session::new("Middle", "Algorithms"));
    orch.begin().await.unwrap();
    assert!(orch.session().current_task().is_none());

    orch.reload_task().await.unwrap();
    assert_eq!(
        orch.session().current_task().map(|t| t.title.as_str()),
        Some("Two Sum")
    );
}

#[tokio::test]
async fn test_skipped_task_stays_written_off_when_next_load_fails() {
    let service = ScriptedService::new();
    service.push_session(fixtures::session_started());
    service.push_task(fixtures::task());
    service.fail_task(ServiceError::Status {
        status: 500,
        body: String::new(),
    });

    let mut orch = Orchestrator::new(Box::new(service.clone()), Session::new("Middle", "Algorithms"));
    orch.begin().await.unwrap();
    orch.chat("SKIP").await.unwrap();
    assert!(orch.session().current_task().is_none());
    assert_eq!(orch.rounds().len(), 1);

    orch.set_editor("def solution(nums): return nums");
    orch.start().await.unwrap();

    assert_eq!(orch.session().stage(), Stage::Coding);
    assert_eq!(orch.session().attempts(), 0);
    assert_eq!(orch.rounds().len(), 1);
    assert_eq!(service.calls(), vec!["start_session", "next_task", "next_task"]);
}

#[tokio::test]
async fn test_recording_round_trips_through_reader() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let recorder = Arc::new(SessionRecorder::new(file.reopen().unwrap()));
    recorder.record_meta(Record::meta_session_start("Middle", "Algorithms", "http://localhost"));

    let service = ScriptedService::new();
    service.push_session(fixtures::session_started());
    script_round(&service);

    let mut orch = Orchestrator::new(Box::new(service), Session::new("Middle", "Algorithms"));
    orch.transcript_mut()
        .add_observer(SessionRecorder::make_observer(Arc::clone(&recorder)));
    orch.add_round_observer(SessionRecorder::make_round_observer(Arc::clone(&recorder)));
    orch.begin().await.unwrap();
    play_round(&mut orch).await;
    recorder.flush().unwrap();

    let result = TranscriptReader::new(file.path()).read().unwrap();
    assert_eq!(result.entries.len(), orch.transcript().len());
    assert_eq!(result.rounds.len(), 1);
    assert_eq!(result.rounds[0].final_score, 100);
    assert!(result
        .entries
        .iter()
        .any(|e| e.entry.author == Author::Candidate && e.entry.text == "O(n)"));
    assert!(result.malformed.is_empty());
}
