//! Scripted transcript fetchers.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::errors::{IngestError, Result};
use crate::fetch::{Transcript, TranscriptFetcher};

/// Returns the same transcript text for every reference and records calls.
#[derive(Debug)]
pub struct StaticTranscriptFetcher {
    text: String,
    language: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl StaticTranscriptFetcher {
    /// Creates a fetcher returning `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reports `language` with each transcript.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Returns the number of fetches.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the requested reference ids, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TranscriptFetcher for StaticTranscriptFetcher {
    async fn fetch(&self, reference_id: &str) -> Result<Transcript> {
        self.calls.lock().push(reference_id.to_string());
        let transcript = Transcript::new(reference_id, self.text.clone());
        Ok(match &self.language {
            Some(language) => transcript.with_language(language.clone()),
            None => transcript,
        })
    }
}

/// Always fails with a fetch error carrying `message`.
#[derive(Debug, Clone)]
pub struct FailingTranscriptFetcher {
    message: String,
}

impl FailingTranscriptFetcher {
    /// Creates a failing fetcher.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl TranscriptFetcher for FailingTranscriptFetcher {
    async fn fetch(&self, _reference_id: &str) -> Result<Transcript> {
        Err(IngestError::fetch(self.message.clone()))
    }
}

/// Sleeps before returning a fixed transcript.
#[derive(Debug, Clone)]
pub struct SlowTranscriptFetcher {
    delay: Duration,
    text: String,
}

impl SlowTranscriptFetcher {
    /// Creates a fetcher that waits `delay` before answering.
    #[must_use]
    pub fn new(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
        }
    }
}

#[async_trait]
impl TranscriptFetcher for SlowTranscriptFetcher {
    async fn fetch(&self, reference_id: &str) -> Result<Transcript> {
        tokio::time::sleep(self.delay).await;
        Ok(Transcript::new(reference_id, self.text.clone()))
    }
}
