//! Session recorder for writing transcript entries to JSONL files.
//!
//! `SessionRecorder` attaches to the transcript as an observer and writes one
//! JSON line per entry, plus metadata records for session start and every
//! finished round. Lines are written immediately so a crashed session still
//! leaves a readable file.

use crate::score::RoundResult;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use vibecode_proto::TranscriptEntry;

/// Event name for transcript entries.
pub const TRANSCRIPT_ENTRY: &str = "transcript.entry";

/// A timestamped record in the JSONL session file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// RFC 3339 UTC timestamp of when the record was written.
    pub ts: String,

    /// The record type discriminator (e.g., "transcript.entry", "_meta.round_finished").
    pub event: String,

    pub data: serde_json::Value,
}

impl Record {
    /// Creates a new record with the current timestamp.
    pub fn new(event: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event: event.into(),
            data: serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn from_entry(entry: &TranscriptEntry) -> Self {
        Self::new(TRANSCRIPT_ENTRY, entry)
    }

    /// Creates a metadata record for session start.
    pub fn meta_session_start(level: &str, topic: &str, base_url: &str) -> Self {
        Self::new(
            "_meta.session_start",
            serde_json::json!({
                "level": level,
                "topic": topic,
                "base_url": base_url,
            }),
        )
    }

    /// Creates a metadata record for a finished or skipped round.
    pub fn meta_round_finished(result: &RoundResult) -> Self {
        Self::new("_meta.round_finished", result)
    }

    pub fn is_entry(&self) -> bool {
        self.event == TRANSCRIPT_ENTRY
    }
}

/// Records transcript entries to a JSONL output.
///
/// The recorder is thread-safe and can be shared between the transcript and
/// round observers.
///
/// # Example
///
/// ```
/// use vibecode_core::SessionRecorder;
/// use vibecode_proto::{Author, TranscriptEntry};
///
/// let mut output = Vec::new();
/// let recorder = SessionRecorder::new(&mut output);
/// recorder.record_entry(&TranscriptEntry::new(0, Author::System, "Hello"));
///
/// drop(recorder);
/// let output_str = String::from_utf8_lossy(&output);
/// assert!(output_str.contains("transcript.entry"));
/// ```
pub struct SessionRecorder<W> {
    writer: Mutex<W>,
    start_time: Instant,
    entry_count: Mutex<u64>,
}

impl<W: Write> SessionRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            start_time: Instant::now(),
            entry_count: Mutex::new(0),
        }
    }

    pub fn record_entry(&self, entry: &TranscriptEntry) {
        if let Ok(mut count) = self.entry_count.lock() {
            *count += 1;
        }
        self.write_record(&Record::from_entry(entry));
    }

    pub fn record_round(&self, result: &RoundResult) {
        self.write_record(&Record::meta_round_finished(result));
    }

    /// Records a metadata event.
    pub fn record_meta(&self, record: Record) {
        self.write_record(&record);
    }

    /// Returns the number of transcript entries recorded.
    pub fn entry_count(&self) -> u64 {
        self.entry_count.lock().map(|g| *g).unwrap_or(0)
    }

    /// Returns the elapsed time since recording started.
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    fn write_record(&self, record: &Record) {
        if let Ok(mut writer) = self.writer.lock() {
            // Recording must never interrupt the interview.
            if let Ok(json) = serde_json::to_string(record) {
                let _ = writeln!(writer, "{}", json);
            }
        }
    }

    /// Flushes the underlying writer.
    pub fn flush(&self) -> io::Result<()> {
        self.writer
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?
            .flush()
    }
}

impl<W: Write + Send + 'static> SessionRecorder<W> {
    /// Creates a transcript observer that records every entry.
    ///
    /// ```ignore
    /// let recorder = Arc::new(SessionRecorder::new(file));
    /// orchestrator.transcript_mut().add_observer(SessionRecorder::make_observer(Arc::clone(&recorder)));
    /// ```
    pub fn make_observer(recorder: Arc<Self>) -> impl Fn(&TranscriptEntry) + Send + 'static {
        move |entry| recorder.record_entry(entry)
    }

    /// Creates a round observer that records every finished round.
    pub fn make_round_observer(recorder: Arc<Self>) -> impl Fn(&RoundResult) + Send + 'static {
        move |result| recorder.record_round(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ScoreBreakdown;
    use vibecode_proto::Author;

    #[test]
    fn test_record_entry() {
        let mut output = Vec::new();
        {
            let recorder = SessionRecorder::new(&mut output);
            recorder.record_entry(&TranscriptEntry::new(3, Author::Candidate, "O(n)"));
            assert_eq!(recorder.entry_count(), 1);
        }

        let line = String::from_utf8_lossy(&output);
        let record: Record = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(record.event, "transcript.entry");
        assert_eq!(record.data["author"], "candidate");
        assert_eq!(record.data["text"], "O(n)");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.ts).is_ok());
    }

    #[test]
    fn test_meta_records() {
        let mut output = Vec::new();
        {
            let recorder = SessionRecorder::new(&mut output);
            recorder.record_meta(Record::meta_session_start("Middle", "Algorithms", "http://x"));
            let score = ScoreBreakdown::default().finalize(1);
            recorder.record_round(&RoundResult::completed("Two Sum", score));
            assert_eq!(recorder.entry_count(), 0);
        }

        let output_str = String::from_utf8_lossy(&output);
        let lines: Vec<&str> = output_str.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("_meta.session_start"));
        assert!(lines[1].contains("_meta.round_finished"));
        assert!(lines[1].contains("\"final_score\":51"));
    }

    #[test]
    fn test_observer_attached_to_transcript() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let recorder = Arc::new(SessionRecorder::new(file.reopen().unwrap()));

        let mut transcript = crate::Transcript::new();
        transcript.add_observer(SessionRecorder::make_observer(Arc::clone(&recorder)));
        transcript.system("Task: Two Sum");
        transcript.candidate("HELP");
        recorder.flush().unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert_eq!(recorder.entry_count(), 2);
    }

    #[test]
    fn test_write_errors_are_swallowed() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let recorder = SessionRecorder::new(Broken);
        recorder.record_entry(&TranscriptEntry::new(0, Author::System, "still fine"));
        assert_eq!(recorder.entry_count(), 1);
    }
}
