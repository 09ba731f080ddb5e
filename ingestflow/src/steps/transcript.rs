//! Transcript steps: fetch a referenced video's transcript, then merge it
//! into the note.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ReferenceExtractor, Step};
use crate::actions::Operation;
use crate::context::PipelineContext;
use crate::errors::Result;
use crate::fetch::TranscriptFetcher;

/// Metadata key holding the transcript language, when the fetcher reports one.
pub const TRANSCRIPT_LANGUAGE_KEY: &str = "transcript_language";

/// Detects an embedded video link and fetches its transcript.
///
/// Skipped when the content has no recognisable reference. On success sets
/// [`PipelineContext::reference_id`], [`PipelineContext::reference_url`] and
/// [`PipelineContext::transcript`].
pub struct FetchTranscriptStep {
    extractor: ReferenceExtractor,
    fetcher: Arc<dyn TranscriptFetcher>,
}

impl FetchTranscriptStep {
    /// Creates the step with the YouTube link patterns.
    pub fn new(fetcher: Arc<dyn TranscriptFetcher>) -> Result<Self> {
        Ok(Self::with_extractor(ReferenceExtractor::youtube()?, fetcher))
    }

    /// Creates the step with custom reference patterns.
    #[must_use]
    pub fn with_extractor(extractor: ReferenceExtractor, fetcher: Arc<dyn TranscriptFetcher>) -> Self {
        Self { extractor, fetcher }
    }
}

impl fmt::Debug for FetchTranscriptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchTranscriptStep")
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Step for FetchTranscriptStep {
    fn name(&self) -> &str {
        "fetch_transcript"
    }

    fn operation(&self) -> Operation {
        Operation::FetchTranscript
    }

    fn precondition(&self, ctx: &PipelineContext) -> bool {
        self.extractor.is_match(&ctx.content)
    }

    async fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        let Some(reference_id) = self.extractor.extract(&ctx.content) else {
            debug!(fingerprint = %ctx.fingerprint, "No reference found; nothing to fetch");
            return Ok(());
        };

        info!(fingerprint = %ctx.fingerprint, reference_id = %reference_id, "Fetching transcript");
        let transcript = self.fetcher.fetch(&reference_id).await?;

        if let Some(language) = transcript.language {
            ctx.set_metadata(TRANSCRIPT_LANGUAGE_KEY, serde_json::json!(language));
        }
        ctx.reference_url = self.extractor.url_for(&reference_id);
        ctx.reference_id = Some(reference_id);
        ctx.transcript = Some(transcript.text);
        ctx.complete_action(Operation::FetchTranscript.done());
        Ok(())
    }
}

/// Appends the fetched transcript to the content under a heading.
#[derive(Debug, Clone)]
pub struct AppendTranscriptStep {
    heading: String,
}

impl Default for AppendTranscriptStep {
    fn default() -> Self {
        Self::new()
    }
}

impl AppendTranscriptStep {
    /// Creates the step with the `## Transcript` heading.
    #[must_use]
    pub fn new() -> Self {
        Self::with_heading("## Transcript")
    }

    /// Creates the step with a custom heading line.
    #[must_use]
    pub fn with_heading(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
        }
    }

    fn render(&self, ctx: &PipelineContext, transcript: &str) -> String {
        let mut section = format!("{}\n\n", self.heading);
        if let Some(url) = &ctx.reference_url {
            section.push_str("Source: ");
            section.push_str(url);
            section.push_str("\n\n");
        }
        section.push_str(transcript);
        section.push('\n');
        section
    }
}

#[async_trait]
impl Step for AppendTranscriptStep {
    fn name(&self) -> &str {
        "append_transcript"
    }

    fn operation(&self) -> Operation {
        Operation::AppendTranscript
    }

    fn precondition(&self, ctx: &PipelineContext) -> bool {
        ctx.transcript.as_deref().is_some_and(|t| !t.is_empty())
    }

    async fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        let Some(transcript) = ctx.transcript.clone() else {
            return Ok(());
        };

        let section = self.render(ctx, &transcript);
        if ctx.content.contains(section.trim_end()) {
            debug!(fingerprint = %ctx.fingerprint, "Transcript section already present");
        } else {
            let body = ctx.content.trim_end();
            ctx.content = if body.is_empty() {
                section
            } else {
                format!("{body}\n\n{section}")
            };
        }

        ctx.complete_action(Operation::AppendTranscript.done());
        Ok(())
    }
}
