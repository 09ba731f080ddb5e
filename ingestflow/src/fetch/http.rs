//! HTTP transcript fetcher backed by `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{TimedTextParser, Transcript, TranscriptFetcher};
use crate::config::FetchConfig;
use crate::errors::{IngestError, Result};

/// Fetches transcripts from a YouTube-compatible timed-text endpoint.
#[derive(Debug, Clone)]
pub struct HttpTranscriptFetcher {
    client: Client,
    config: FetchConfig,
    parser: TimedTextParser,
}

impl HttpTranscriptFetcher {
    /// Builds a fetcher with its own HTTP client.
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout()?)
            .build()
            .map_err(|e| IngestError::config(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(client, config)
    }

    /// Builds a fetcher around an existing client.
    pub fn with_client(client: Client, config: FetchConfig) -> Result<Self> {
        Ok(Self {
            client,
            config,
            parser: TimedTextParser::new()?,
        })
    }

    /// Gets the configuration.
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl TranscriptFetcher for HttpTranscriptFetcher {
    async fn fetch(&self, reference_id: &str) -> Result<Transcript> {
        let url = &self.config.base_url;
        debug!(reference_id, url = %url, "Requesting transcript");

        let response = self
            .client
            .get(url)
            .query(&[("lang", self.config.language.as_str()), ("v", reference_id)])
            .send()
            .await
            .map_err(|e| IngestError::fetch(format!("{reference_id}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::fetch(format!("{reference_id}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| IngestError::fetch(format!("{reference_id}: failed to read body: {e}")))?;

        let text = self.parser.parse(&body);
        if text.is_empty() {
            return Err(IngestError::fetch(format!(
                "{reference_id}: no transcript available"
            )));
        }

        Ok(Transcript::new(reference_id, text).with_language(self.config.language.clone()))
    }
}
