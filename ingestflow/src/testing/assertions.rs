//! Assertions over an item's action log.

use crate::actions::Operation;
use crate::records::{LogEntry, RecordManager};

fn start_entry(records: &RecordManager, fingerprint: &str, operation: Operation) -> LogEntry {
    records
        .entry(fingerprint, operation.start())
        .unwrap_or_else(|| {
            panic!(
                "Expected a '{}' entry for '{fingerprint}', found: {:?}",
                operation.start(),
                labels(records, fingerprint)
            )
        })
}

fn labels(records: &RecordManager, fingerprint: &str) -> Vec<String> {
    records
        .entries(fingerprint)
        .iter()
        .map(|e| e.action.label())
        .collect()
}

/// Asserts that `operation` started and completed for `fingerprint`.
pub fn assert_completed(records: &RecordManager, fingerprint: &str, operation: Operation) {
    let start = start_entry(records, fingerprint, operation);
    assert!(start.completed, "Expected '{}' to be completed", operation.start());

    let done = records.entry(fingerprint, operation.done());
    assert!(
        done.as_ref().is_some_and(|e| e.completed),
        "Expected a completed '{}' entry, got {done:?}",
        operation.done()
    );
}

/// Asserts that `operation` started but has not completed.
pub fn assert_pending(records: &RecordManager, fingerprint: &str, operation: Operation) {
    let start = start_entry(records, fingerprint, operation);
    assert!(!start.completed, "Expected '{}' to be pending", operation.start());
    assert!(
        records.entry(fingerprint, operation.done()).is_none(),
        "Unexpected '{}' entry",
        operation.done()
    );
}

/// Asserts that `operation` failed with `message` and never completed.
pub fn assert_failed(records: &RecordManager, fingerprint: &str, operation: Operation, message: &str) {
    let start = start_entry(records, fingerprint, operation);
    assert!(!start.completed, "Expected '{}' not to complete", operation.start());

    let entry = records
        .entry(fingerprint, operation.error())
        .unwrap_or_else(|| panic!("Expected a '{}' entry", operation.error()));
    let error = entry
        .error
        .unwrap_or_else(|| panic!("Expected '{}' to carry an error", operation.error()));
    assert_eq!(error.message, message, "Unexpected error message");
}

/// Asserts that nothing was logged for `fingerprint`.
pub fn assert_no_entries(records: &RecordManager, fingerprint: &str) {
    let labels = labels(records, fingerprint);
    assert!(labels.is_empty(), "Expected no entries, found: {labels:?}");
}
