//! The record manager: lifecycle bookkeeping per content item.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{ActionLog, InMemoryRecordStore, LogEntry, RecordStore};
use crate::actions::Action;
use crate::errors::ErrorRecord;

/// Records start, completion and error events keyed by fingerprint.
///
/// The manager is a cheap handle; clones share the same store. Store
/// failures are logged and swallowed so that bookkeeping never aborts a run.
#[derive(Debug, Clone)]
pub struct RecordManager {
    store: Arc<dyn RecordStore>,
}

impl Default for RecordManager {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl RecordManager {
    /// Creates a manager over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Creates a manager over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRecordStore::new()))
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Records a start event. Overwrites an earlier entry for the same action.
    ///
    /// Starting an operation again drops the done and error entries left by
    /// its previous attempt, so each start resolves to exactly one outcome.
    pub fn add_action(&self, fingerprint: &str, action: Action) {
        debug!(fingerprint, action = %action, "Recording action start");
        let entry = LogEntry::started(action, Utc::now());
        let operation = action.operation;
        let restart = action.is_start();
        self.write(fingerprint, &mut |log: &mut ActionLog| {
            if restart {
                log.remove(operation.done());
                log.remove(operation.error());
            }
            log.upsert(entry.clone());
        });
    }

    /// Marks the operation of `action` as completed.
    ///
    /// The start entry is flagged `completed` and a done entry is written.
    /// Without a start entry this is a no-op.
    pub fn complete_action(&self, fingerprint: &str, action: Action) {
        let start = action.as_start();
        let done = action.operation.done();
        let mut found = false;

        self.write(fingerprint, &mut |log: &mut ActionLog| {
            let Some(entry) = log.get_mut(start) else {
                return;
            };
            entry.completed = true;
            let started_at = entry.timestamp;
            found = true;
            log.upsert(LogEntry::completed(done, Utc::now().max(started_at)));
        });

        if found {
            debug!(fingerprint, action = %done, "Recorded action completion");
        } else {
            warn!(
                fingerprint,
                action = %done,
                "Completion recorded without a matching start; ignoring"
            );
        }
    }

    /// Records an error under the error's action label.
    pub fn add_error(&self, fingerprint: &str, error: ErrorRecord) {
        debug!(
            fingerprint,
            action = %error.action,
            message = %error.message,
            "Recording action error"
        );
        let entry = LogEntry::failed(error, Utc::now());
        self.write(fingerprint, &mut |log: &mut ActionLog| log.upsert(entry.clone()));
    }

    /// All entries for a fingerprint, in first-write order.
    #[must_use]
    pub fn entries(&self, fingerprint: &str) -> Vec<LogEntry> {
        self.log(fingerprint)
            .map(|log| log.entries().to_vec())
            .unwrap_or_default()
    }

    /// The entry for one action, if recorded.
    #[must_use]
    pub fn entry(&self, fingerprint: &str, action: Action) -> Option<LogEntry> {
        self.log(fingerprint)
            .and_then(|log| log.get(action).cloned())
    }

    /// The full log for a fingerprint.
    #[must_use]
    pub fn log(&self, fingerprint: &str) -> Option<ActionLog> {
        match self.store.load(fingerprint) {
            Ok(log) => log,
            Err(e) => {
                warn!(fingerprint, error = %e, "Failed to read action log");
                None
            }
        }
    }

    /// Every fingerprint with recorded entries.
    #[must_use]
    pub fn fingerprints(&self) -> Vec<String> {
        self.store.fingerprints().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list action logs");
            Vec::new()
        })
    }

    /// Drops the log for a fingerprint, e.g. before re-processing an item.
    pub fn clear(&self, fingerprint: &str) {
        if let Err(e) = self.store.remove(fingerprint) {
            warn!(fingerprint, error = %e, "Failed to clear action log");
        }
    }

    fn write(&self, fingerprint: &str, apply: &mut dyn FnMut(&mut ActionLog)) {
        if let Err(e) = self.store.update(fingerprint, apply) {
            warn!(fingerprint, error = %e, "Failed to write action log");
        }
    }
}
