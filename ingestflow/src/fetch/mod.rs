//! Transcript fetching.
//!
//! The fetch step only depends on the [`TranscriptFetcher`] trait; the HTTP
//! implementation is available behind the `http` feature.

#[cfg(feature = "http")]
mod http;
mod timedtext;

#[cfg(feature = "http")]
pub use http::HttpTranscriptFetcher;
pub use timedtext::TimedTextParser;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// A fetched transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// The reference the transcript belongs to (e.g. a video id).
    pub reference_id: String,
    /// Language code, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Transcript text.
    pub text: String,
}

impl Transcript {
    /// Creates a transcript without language information.
    #[must_use]
    pub fn new(reference_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            reference_id: reference_id.into(),
            language: None,
            text: text.into(),
        }
    }

    /// Sets the language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// External collaborator that retrieves the transcript for a reference.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetches the transcript for `reference_id`.
    async fn fetch(&self, reference_id: &str) -> Result<Transcript>;
}
