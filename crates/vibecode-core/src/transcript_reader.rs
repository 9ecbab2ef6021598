//! Reader for recorded transcript files.
//!
//! Parses the JSONL written by [`SessionRecorder`](crate::SessionRecorder)
//! back into transcript entries and round results. Lines that fail to parse
//! are collected rather than aborting the read.

use crate::score::RoundResult;
use crate::session_recorder::{Record, TRANSCRIPT_ENTRY};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::warn;
use vibecode_proto::TranscriptEntry;

/// A transcript entry with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedEntry {
    pub ts: String,
    #[serde(flatten)]
    pub entry: TranscriptEntry,
}

/// Result of reading a recorded transcript.
#[derive(Debug, Clone, Default)]
pub struct ReadResult {
    pub entries: Vec<RecordedEntry>,
    pub rounds: Vec<RoundResult>,
    /// Lines that failed to parse.
    pub malformed: Vec<MalformedLine>,
}

/// Information about a malformed JSONL line.
#[derive(Debug, Clone, Serialize)]
pub struct MalformedLine {
    /// Line number in the file (1-indexed).
    pub line_number: u64,
    /// The raw content that failed to parse (truncated if very long).
    pub content: String,
    pub error: String,
}

impl MalformedLine {
    const MAX_CONTENT_LEN: usize = 100;

    /// Creates a new MalformedLine, truncating content if needed.
    pub fn new(line_number: u64, content: &str, error: String) -> Self {
        let content = match content.char_indices().nth(Self::MAX_CONTENT_LEN) {
            Some((cut, _)) => format!("{}...", &content[..cut]),
            None => content.to_string(),
        };
        Self {
            line_number,
            content,
            error,
        }
    }
}

pub struct TranscriptReader {
    path: PathBuf,
}

impl TranscriptReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the whole file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn read(&self) -> std::io::Result<ReadResult> {
        let file = File::open(&self.path)?;
        Self::read_from(BufReader::new(file))
    }

    /// Reads records from any buffered source.
    pub fn read_from<R: BufRead>(reader: R) -> std::io::Result<ReadResult> {
        let mut result = ReadResult::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index as u64 + 1;
            if line.trim().is_empty() {
                continue;
            }

            let parsed = serde_json::from_str::<Record>(&line).and_then(|record| {
                match record.event.as_str() {
                    TRANSCRIPT_ENTRY => serde_json::from_value(record.data).map(|entry| {
                        Parsed::Entry(RecordedEntry {
                            ts: record.ts,
                            entry,
                        })
                    }),
                    "_meta.round_finished" => serde_json::from_value(record.data).map(Parsed::Round),
                    _ => Ok(Parsed::Other),
                }
            });

            match parsed {
                Ok(Parsed::Entry(entry)) => result.entries.push(entry),
                Ok(Parsed::Round(round)) => result.rounds.push(round),
                Ok(Parsed::Other) => {}
                Err(e) => {
                    warn!(error = %e, line_number, "Malformed transcript line");
                    result
                        .malformed
                        .push(MalformedLine::new(line_number, &line, e.to_string()));
                }
            }
        }

        Ok(result)
    }
}

enum Parsed {
    Entry(RecordedEntry),
    Round(RoundResult),
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_recorder::SessionRecorder;
    use std::io::{Cursor, Write};
    use vibecode_proto::Author;

    #[test]
    fn test_reads_back_recorded_session() {
        let mut output = Vec::new();
        {
            let recorder = SessionRecorder::new(&mut output);
            recorder.record_meta(Record::meta_session_start("Middle", "Algorithms", "http://x"));
            recorder.record_entry(&TranscriptEntry::new(0, Author::System, "Task: Two Sum"));
            recorder.record_entry(&TranscriptEntry::new(1, Author::Candidate, "SKIP"));
            recorder.record_round(&RoundResult::skipped("Two Sum"));
        }

        let result = TranscriptReader::read_from(Cursor::new(output)).unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[1].entry.author, Author::Candidate);
        assert!(!result.entries[1].ts.is_empty());
        assert_eq!(result.rounds, vec![RoundResult::skipped("Two Sum")]);
        assert!(result.malformed.is_empty());
    }

    #[test]
    fn test_captures_malformed_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"ts":"2026-01-01T00:00:00Z","event":"transcript.entry","data":{{"id":0,"author":"system","text":"hi"}}}}"#
        )
        .unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"ts":"2026-01-01T00:00:01Z","event":"transcript.entry","data":{{"id":1,"author":"robot","text":"?"}}}}"#
        )
        .unwrap();

        let result = TranscriptReader::new(file.path()).read().unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.malformed.len(), 2);
        assert_eq!(result.malformed[0].line_number, 2);
        assert_eq!(result.malformed[1].line_number, 4);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TranscriptReader::new(dir.path().join("none.jsonl")).read().is_err());
    }

    #[test]
    fn test_truncates_long_content() {
        let long = "é".repeat(150);
        let malformed = MalformedLine::new(1, &long, "bad".to_string());
        assert!(malformed.content.ends_with("..."));
        assert_eq!(malformed.content.chars().count(), 103);
    }
}
