//! Interactive interview on stdin/stdout.
//!
//! Lines starting with `/` are editor controls; everything else is chat.

use crate::{colors, print_entry};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use vibecode_adapters::HttpInterviewService;
use vibecode_core::{InterviewConfig, Orchestrator, Record, RoundResult, Session, SessionRecorder};

const HELP: &str = "\
Commands:
  /start [file]  Run the tests (optionally loading the editor from a file first)
  /edit <file>   Load the editor from a file
  /code          Show the editor contents
  /console       Show the last test output
  /skip          Skip the task (or move on after a round)
  /stats         Show anti-cheat counters
  /rounds        Show finished rounds and the total score
  /retry         Retry loading a task after a failure
  /quit          Leave the interview
Anything else is sent to the interviewer (HELP <question>, SKIP, NEXT, answers).";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Start(Option<PathBuf>),
    Edit(PathBuf),
    Code,
    Console,
    Skip,
    Stats,
    Rounds,
    Retry,
    Help,
    Quit,
    Chat(String),
    Empty,
    Invalid(String),
}

impl ReplCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return ReplCommand::Chat(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };

        match (name, arg) {
            ("start", arg) => ReplCommand::Start(arg.map(PathBuf::from)),
            ("edit", Some(path)) => ReplCommand::Edit(PathBuf::from(path)),
            ("edit", None) => ReplCommand::Invalid("Usage: /edit <file>".to_string()),
            ("code", _) => ReplCommand::Code,
            ("console", _) => ReplCommand::Console,
            ("skip", _) => ReplCommand::Skip,
            ("stats", _) => ReplCommand::Stats,
            ("rounds", _) => ReplCommand::Rounds,
            ("retry", _) => ReplCommand::Retry,
            ("help", _) => ReplCommand::Help,
            ("quit" | "exit", _) => ReplCommand::Quit,
            (other, _) => ReplCommand::Invalid(format!("Unknown command /{other}. Type /help.")),
        }
    }
}

/// Runs one interactive interview until `/quit` or end of input.
pub async fn run(config: InterviewConfig, use_colors: bool) -> Result<()> {
    let service = HttpInterviewService::new(config.api.base_url.clone())
        .with_timeout(config.api.request_timeout());
    let session = Session::new(config.session.level.clone(), config.session.topic.clone());
    let mut orch = Orchestrator::new(Box::new(service), session);

    orch.transcript_mut()
        .add_observer(move |entry| print_entry(entry, use_colors));

    let recorder = match &config.recording.path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create recording {}", path.display()))?;
            let recorder = Arc::new(SessionRecorder::new(file));
            recorder.record_meta(Record::meta_session_start(
                &config.session.level,
                &config.session.topic,
                &config.api.base_url,
            ));
            orch.transcript_mut()
                .add_observer(SessionRecorder::make_observer(Arc::clone(&recorder)));
            orch.add_round_observer(SessionRecorder::make_round_observer(Arc::clone(&recorder)));
            info!(path = %path.display(), "Recording transcript");
            Some(recorder)
        }
        None => None,
    };

    orch.begin().await?;
    println!("{}", dim("Type /help for commands.", use_colors));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Empty => {}
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Invalid(message) => println!("{}", dim(&message, use_colors)),
            ReplCommand::Edit(path) => {
                if load_editor(&mut orch, &path) {
                    let message = format!("Editor loaded from {}", path.display());
                    println!("{}", dim(&message, use_colors));
                }
            }
            ReplCommand::Start(path) => {
                if path.as_ref().is_none_or(|p| load_editor(&mut orch, p)) {
                    orch.start().await?;
                    print_console(orch.console(), use_colors);
                }
            }
            ReplCommand::Code => println!("{}", orch.editor()),
            ReplCommand::Console => print_console(orch.console(), use_colors),
            ReplCommand::Skip => orch.skip().await?,
            ReplCommand::Retry => orch.reload_task().await?,
            ReplCommand::Stats => {
                let stats = orch.anti_cheat().snapshot();
                println!(
                    "Focus lost: {}  Copies: {}  Editor pastes: {}  Total: {}",
                    stats.blur_count(),
                    stats.copy_count(),
                    stats.editor_paste_count(),
                    stats.total_violations()
                );
            }
            ReplCommand::Rounds => print_rounds(orch.rounds(), use_colors),
            ReplCommand::Chat(text) => orch.chat(text).await?,
        }
        prompt();
    }

    if let Some(recorder) = recorder {
        recorder.flush().context("Failed to flush recording")?;
        info!(
            entries = recorder.entry_count(),
            elapsed_secs = recorder.elapsed().as_secs(),
            "Recording finished"
        );
    }
    println!();
    print_rounds(orch.rounds(), use_colors);
    Ok(())
}

/// Replaces the editor with a file's contents. Returns false after reporting a read error.
fn load_editor(orch: &mut Orchestrator, path: &Path) -> bool {
    match std::fs::read_to_string(path) {
        Ok(code) => {
            orch.set_editor(code);
            true
        }
        Err(e) => {
            eprintln!("Cannot read {}: {e}", path.display());
            false
        }
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn dim(text: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{}{}{}", colors::DIM, text, colors::RESET)
    } else {
        text.to_string()
    }
}

fn print_console(console: &str, use_colors: bool) {
    if console.is_empty() {
        return;
    }
    if use_colors {
        println!("{}── console ──{}\n{}", colors::YELLOW, colors::RESET, console);
    } else {
        println!("-- console --\n{console}");
    }
}

/// Prints finished rounds with the cumulative total.
pub fn print_rounds(rounds: &[RoundResult], use_colors: bool) {
    if rounds.is_empty() {
        println!("No rounds finished yet.");
        return;
    }
    for (i, round) in rounds.iter().enumerate() {
        let status = if round.skipped { "skipped" } else { "done" };
        println!(
            "{:>3}. {:<40} {:>3}/100  {}",
            i + 1,
            round.task_title,
            round.final_score,
            status
        );
    }
    let total: u32 = rounds.iter().map(|r| r.final_score).sum();
    if use_colors {
        println!("{}Total: {}{}", colors::BOLD, total, colors::RESET);
    } else {
        println!("Total: {total}");
    }
}
