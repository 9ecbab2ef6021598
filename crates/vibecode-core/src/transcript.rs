//! Append-only interview transcript.
//!
//! The transcript is the authoritative chat order. Entries are never edited
//! or removed. Observers can be attached to receive every entry as it is
//! appended, which is how recording and console rendering subscribe without
//! the orchestrator knowing about them.

use vibecode_proto::{Author, TranscriptEntry};

/// Type alias for the observer callback function.
type Observer = Box<dyn Fn(&TranscriptEntry) + Send + 'static>;

#[derive(Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
    observers: Vec<Observer>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer that receives every appended entry.
    ///
    /// Observers are called in registration order, after the entry is stored.
    pub fn add_observer<F>(&mut self, observer: F)
    where
        F: Fn(&TranscriptEntry) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Appends a message and returns its id.
    pub fn append(&mut self, author: Author, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(TranscriptEntry::new(id, author, text));
        if let Some(entry) = self.last() {
            for observer in &self.observers {
                observer(entry);
            }
        }
        id
    }

    pub fn system(&mut self, text: impl Into<String>) -> u64 {
        self.append(Author::System, text)
    }

    pub fn candidate(&mut self, text: impl Into<String>) -> u64 {
        self.append(Author::Candidate, text)
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript")
            .field("entries", &self.entries)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_append_preserves_order_and_assigns_ids() {
        let mut transcript = Transcript::new();
        let first = transcript.system("Hello");
        let second = transcript.candidate("Hi");

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        let texts: Vec<&str> = transcript.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "Hi"]);
        assert_eq!(transcript.entries()[1].author, Author::Candidate);
    }

    #[test]
    fn test_observers_receive_all_entries() {
        let mut transcript = Transcript::new();
        let observed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let observed_clone = Arc::clone(&observed);
        transcript.add_observer(move |entry| {
            observed_clone.lock().unwrap().push(entry.text.clone());
        });

        transcript.system("one");
        transcript.candidate("two");

        let captured = observed.lock().unwrap();
        assert_eq!(*captured, vec!["one".to_string(), "two".to_string()]);
    }
}
