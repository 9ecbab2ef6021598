//! # vibecode-cli
//!
//! Binary entry point for the Vibecode interviewer.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Configuration loading with command-line overrides
//! - The interactive interview on stdin/stdout via `vibecode run`
//! - Recorded transcript viewing via `vibecode transcript`

mod interview;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{IsTerminal, stdout};
use std::path::PathBuf;
use tracing::debug;
use vibecode_core::{InterviewConfig, RecordedEntry, TranscriptReader};
use vibecode_proto::{Author, TranscriptEntry};

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// Output format for the transcript command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for programmatic access
    Json,
}

/// Author filter for the transcript command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthorFilter {
    System,
    Candidate,
}

impl From<AuthorFilter> for Author {
    fn from(filter: AuthorFilter) -> Self {
        match filter {
            AuthorFilter::System => Author::System,
            AuthorFilter::Candidate => Author::Candidate,
        }
    }
}

/// ANSI color codes for terminal output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Vibecode - automated multi-stage coding interviews
#[derive(Parser, Debug)]
#[command(name = "vibecode", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // ─────────────────────────────────────────────────────────────────────────
    // Global options (available for all subcommands)
    // ─────────────────────────────────────────────────────────────────────────

    /// Path to configuration file
    #[arg(short, long, default_value = "vibecode.yml", global = true)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an interactive interview (default if no subcommand given)
    Run(RunArgs),

    /// View a recorded interview transcript
    Transcript(TranscriptArgs),
}

/// Arguments for the run subcommand.
#[derive(Parser, Debug, Default)]
struct RunArgs {
    /// Override the service base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the candidate level (Junior, Middle, Senior)
    #[arg(long)]
    level: Option<String>,

    /// Override the task topic
    #[arg(long)]
    topic: Option<String>,

    /// Record the transcript to this JSONL file
    #[arg(long)]
    record: Option<PathBuf>,
}

/// Arguments for the transcript subcommand.
#[derive(Parser, Debug)]
struct TranscriptArgs {
    /// Path to the recorded JSONL file
    #[arg(long)]
    file: PathBuf,

    /// Show only entries by this author
    #[arg(long, value_enum)]
    author: Option<AuthorFilter>,

    /// Show only the last N entries
    #[arg(long)]
    last: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = InterviewConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    // Logs go to stderr and stay quiet by default so they do not interleave with the chat.
    let filter = if cli.verbose || config.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!(config = %cli.config.display(), "Configuration resolved");

    match cli.command {
        Some(Commands::Run(args)) => run_command(config, cli.color, args).await,
        Some(Commands::Transcript(args)) => transcript_command(cli.color, args),
        None => run_command(config, cli.color, RunArgs::default()).await,
    }
}

async fn run_command(mut config: InterviewConfig, color_mode: ColorMode, args: RunArgs) -> Result<()> {
    // Apply CLI overrides
    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }
    if let Some(level) = args.level {
        config.session.level = level;
    }
    if let Some(topic) = args.topic {
        config.session.topic = topic;
    }
    if let Some(record) = args.record {
        config.recording.path = Some(record);
    }

    let warnings = config.validate().context("Configuration validation failed")?;
    for warning in &warnings {
        eprintln!("{warning}");
    }

    interview::run(config, color_mode.should_use_colors()).await
}

fn transcript_command(color_mode: ColorMode, args: TranscriptArgs) -> Result<()> {
    let use_colors = color_mode.should_use_colors();

    let result = TranscriptReader::new(&args.file)
        .read()
        .with_context(|| format!("Failed to read transcript {}", args.file.display()))?;

    if !result.malformed.is_empty() {
        eprintln!(
            "Skipped {} malformed line(s) in {}",
            result.malformed.len(),
            args.file.display()
        );
    }

    let entries = filter_entries(result.entries, args.author.map(Author::from), args.last);

    if entries.is_empty() {
        if use_colors {
            println!("{}No matching entries found.{}", colors::DIM, colors::RESET);
        } else {
            println!("No matching entries found.");
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)?;
            println!("{json}");
        }
        OutputFormat::Table => {
            print_transcript_table(&entries, use_colors);
            if !result.rounds.is_empty() {
                println!();
                interview::print_rounds(&result.rounds, use_colors);
            }
        }
    }

    Ok(())
}

/// Applies the author filter, then keeps the last N of what remains.
fn filter_entries(
    mut entries: Vec<RecordedEntry>,
    author: Option<Author>,
    last: Option<usize>,
) -> Vec<RecordedEntry> {
    if let Some(author) = author {
        entries.retain(|e| e.entry.author == author);
    }
    if let Some(n) = last
        && entries.len() > n
    {
        entries.drain(..entries.len() - n);
    }
    entries
}

fn print_transcript_table(entries: &[RecordedEntry], use_colors: bool) {
    use colors::*;

    if use_colors {
        println!("{BOLD}{DIM}  # │ Time     │ Author    │ Text{RESET}");
        println!("{DIM}────┼──────────┼───────────┼──────────────────────────────────────────{RESET}");
    } else {
        println!("  # | Time     | Author    | Text");
        println!("----|----------|-----------|------------------------------------------");
    }

    for record in entries {
        let time = chrono::DateTime::parse_from_rfc3339(&record.ts)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|_| "-".to_string());
        let text = truncate(&record.entry.text.replace('\n', " "), 60);
        let author = record.entry.author.as_str();

        if use_colors {
            println!(
                "{DIM}{:>3}{RESET} │ {:<8} │ {}{:<9}{RESET} │ {}",
                record.entry.id,
                time,
                author_color(record.entry.author),
                author,
                text
            );
        } else {
            println!("{:>3} | {:<8} | {:<9} | {}", record.entry.id, time, author, text);
        }
    }
}

fn author_color(author: Author) -> &'static str {
    match author {
        Author::System => colors::CYAN,
        Author::Candidate => colors::GREEN,
    }
}

/// Prints one live transcript entry.
fn print_entry(entry: &TranscriptEntry, use_colors: bool) {
    let label = match entry.author {
        Author::System => "Interviewer",
        Author::Candidate => "You",
    };
    if use_colors {
        println!(
            "{}{}{}:{} {}",
            colors::BOLD,
            author_color(entry.author),
            label,
            colors::RESET,
            entry.text
        );
    } else {
        println!("{label}: {}", entry.text);
    }
}

/// Truncates to at most `max_chars` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars.saturating_sub(1)) {
        Some((cut, _)) if s.chars().count() > max_chars => format!("{}…", &s[..cut]),
        _ => s.to_string(),
    }
}
