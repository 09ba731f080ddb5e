//! Mutable per-run context threaded through pipeline steps.

use std::collections::HashMap;
use std::sync::Arc;

use super::Fingerprint;
use crate::actions::Action;
use crate::cancellation::CancellationToken;
use crate::errors::ErrorRecord;
use crate::records::RecordManager;

/// The mutable context for one pipeline run over one content item.
///
/// Exactly one run owns a context; steps receive it by `&mut`.
#[derive(Debug)]
pub struct PipelineContext {
    /// Fingerprint of the item being processed.
    pub fingerprint: Fingerprint,
    /// The content, possibly rewritten by steps.
    pub content: String,
    /// Identifier extracted from an embedded reference (e.g. a video id).
    pub reference_id: Option<String>,
    /// Canonical link for `reference_id`, when the extractor knows one.
    pub reference_url: Option<String>,
    /// Transcript fetched for `reference_id`.
    pub transcript: Option<String>,
    /// Free-form fields added by custom steps.
    pub metadata: HashMap<String, serde_json::Value>,
    records: RecordManager,
    cancel: Arc<CancellationToken>,
}

impl PipelineContext {
    /// Creates a context writing to `records`.
    #[must_use]
    pub fn new(
        fingerprint: impl Into<Fingerprint>,
        content: impl Into<String>,
        records: RecordManager,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            content: content.into(),
            reference_id: None,
            reference_url: None,
            transcript: None,
            metadata: HashMap::new(),
            records,
            cancel: Arc::new(CancellationToken::new()),
        }
    }

    /// Creates a context whose fingerprint is derived from the content.
    #[must_use]
    pub fn from_content(content: impl Into<String>, records: RecordManager) -> Self {
        let content = content.into();
        Self::new(Fingerprint::from_content(&content), content, records)
    }

    /// Shares an existing cancellation token with this run.
    #[must_use]
    pub fn with_cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.cancel = token;
        self
    }

    /// The record manager handle.
    #[must_use]
    pub const fn records(&self) -> &RecordManager {
        &self.records
    }

    /// The run's cancellation token.
    #[must_use]
    pub const fn cancellation(&self) -> &Arc<CancellationToken> {
        &self.cancel
    }

    /// Records a start event for this item.
    pub fn add_action(&self, action: Action) {
        self.records.add_action(self.fingerprint.as_str(), action);
    }

    /// Records a completion for this item.
    pub fn complete_action(&self, action: Action) {
        self.records.complete_action(self.fingerprint.as_str(), action);
    }

    /// Records an error for this item.
    pub fn add_error(&self, error: ErrorRecord) {
        self.records.add_error(self.fingerprint.as_str(), error);
    }

    /// Sets a metadata field.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
    }
}
