//! Log entry and per-item action log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::{Action, Phase};
use crate::errors::ErrorRecord;

/// One row of the action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The action this entry is filed under.
    pub action: Action,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// Whether the operation finished successfully.
    pub completed: bool,
    /// Failure details, for error-phase entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

impl LogEntry {
    /// A fresh start entry.
    #[must_use]
    pub fn started(action: Action, timestamp: DateTime<Utc>) -> Self {
        Self {
            action,
            timestamp,
            completed: false,
            error: None,
        }
    }

    /// A completed entry.
    #[must_use]
    pub fn completed(action: Action, timestamp: DateTime<Utc>) -> Self {
        Self {
            action,
            timestamp,
            completed: true,
            error: None,
        }
    }

    /// An error entry filed under the record's action.
    #[must_use]
    pub fn failed(error: ErrorRecord, timestamp: DateTime<Utc>) -> Self {
        Self {
            action: error.action,
            timestamp,
            completed: false,
            error: Some(error),
        }
    }

    /// Returns true if this entry carries an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Ordered log of one content item, at most one entry per action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
}

impl ActionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing an existing one for the same action in place.
    pub fn upsert(&mut self, entry: LogEntry) {
        match self.get_mut(entry.action) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Removes the entry for an action, returning it.
    pub fn remove(&mut self, action: Action) -> Option<LogEntry> {
        let index = self.entries.iter().position(|e| e.action == action)?;
        Some(self.entries.remove(index))
    }

    /// Looks up the entry for an action.
    #[must_use]
    pub fn get(&self, action: Action) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.action == action)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, action: Action) -> Option<&mut LogEntry> {
        self.entries.iter_mut().find(|e| e.action == action)
    }

    /// All entries in first-write order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the log has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start entries with neither a done nor an error entry yet.
    pub fn unresolved(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter().filter(move |e| {
            e.action.phase == Phase::Start
                && self.get(e.action.operation.done()).is_none()
                && self.get(e.action.operation.error()).is_none()
        })
    }
}

impl From<Vec<LogEntry>> for ActionLog {
    fn from(entries: Vec<LogEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.upsert(entry);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Operation;

    #[test]
    fn test_upsert_replaces_in_place() {
        let now = Utc::now();
        let mut log = ActionLog::new();
        log.upsert(LogEntry::started(Operation::FetchTranscript.start(), now));
        log.upsert(LogEntry::started(Operation::AppendTranscript.start(), now));
        log.upsert(LogEntry::completed(Operation::FetchTranscript.start(), now));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].action, Operation::FetchTranscript.start());
        assert!(log.entries()[0].completed);
    }

    #[test]
    fn test_remove_keeps_order() {
        let now = Utc::now();
        let mut log = ActionLog::from(vec![
            LogEntry::started(Operation::FetchTranscript.start(), now),
            LogEntry::completed(Operation::FetchTranscript.done(), now),
            LogEntry::started(Operation::AppendTranscript.start(), now),
        ]);

        assert!(log.remove(Operation::FetchTranscript.done()).is_some());
        assert!(log.remove(Operation::FetchTranscript.done()).is_none());
        let actions: Vec<_> = log.entries().iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![Operation::FetchTranscript.start(), Operation::AppendTranscript.start()]
        );
    }

    #[test]
    fn test_unresolved() {
        let now = Utc::now();
        let mut log = ActionLog::new();
        log.upsert(LogEntry::started(Operation::FetchTranscript.start(), now));
        log.upsert(LogEntry::started(Operation::AppendTranscript.start(), now));
        log.upsert(LogEntry::completed(Operation::FetchTranscript.done(), now));

        let pending: Vec<_> = log.unresolved().map(|e| e.action).collect();
        assert_eq!(pending, vec![Operation::AppendTranscript.start()]);
    }

    #[test]
    fn test_failed_entry_uses_record_action() {
        let record = ErrorRecord::new(Operation::FetchTranscript.error(), "boom", "stack");
        let entry = LogEntry::failed(record, Utc::now());

        assert_eq!(entry.action, Operation::FetchTranscript.error());
        assert!(entry.is_error());
        assert!(!entry.completed);
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = LogEntry::started(Operation::FetchTranscript.start(), Utc::now());
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["action"], "fetch_transcript");
        assert_eq!(value["completed"], false);
        assert!(value.get("error").is_none());
    }
}
