//! Sequential step runner.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{PipelineBuilder, RunReport, StepReport, StepStatus};
use crate::config::PipelineConfig;
use crate::context::PipelineContext;
use crate::errors::{IngestError, Result};
use crate::events::{EventSink, LoggingEventSink};
use crate::executor::StepExecutor;
use crate::fetch::TranscriptFetcher;
use crate::steps::{AppendTranscriptStep, FetchTranscriptStep, Step};

/// An ordered list of steps run against one item at a time.
///
/// Steps whose precondition does not hold are skipped without touching the
/// action log. The first failing step aborts the run.
pub struct Pipeline {
    pub(super) name: String,
    pub(super) steps: Vec<Arc<dyn Step>>,
    pub(super) executor: StepExecutor,
    pub(super) sink: Arc<dyn EventSink>,
    pub(super) max_concurrency: usize,
}

/// Result of one item in a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The context after the run, with any content changes applied.
    pub context: PipelineContext,
    /// The run result.
    pub result: Result<RunReport>,
}

impl BatchOutcome {
    /// Returns true if the run succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .field("executor", &self.executor)
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Starts building a pipeline.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(name)
    }

    /// The fetch-then-append transcript pipeline, reporting events to
    /// `tracing` through a [`LoggingEventSink`].
    pub fn transcript(fetcher: Arc<dyn TranscriptFetcher>, config: &PipelineConfig) -> Result<Self> {
        Self::builder("transcript")
            .step(FetchTranscriptStep::new(fetcher)?)
            .step(AppendTranscriptStep::new())
            .with_config(config)
            .with_event_sink(Arc::new(LoggingEventSink::default()))
            .build()
    }

    /// The transcript pipeline backed by the HTTP fetcher.
    #[cfg(feature = "http")]
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = crate::fetch::HttpTranscriptFetcher::new(config.fetch.clone())?;
        Self::transcript(Arc::new(fetcher), config)
    }

    /// Pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// The executor wrapping each step.
    #[must_use]
    pub const fn executor(&self) -> &StepExecutor {
        &self.executor
    }

    /// Items processed concurrently by [`Self::run_batch`].
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Runs every step against one item.
    ///
    /// # Errors
    ///
    /// Returns the first step error unchanged. Its error entry has already
    /// been written to the action log.
    pub async fn run(&self, ctx: &mut PipelineContext) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(pipeline = %self.name, fingerprint = %ctx.fingerprint, %run_id, "Pipeline started");
        self.sink
            .emit(
                "pipeline.started",
                Some(serde_json::json!({
                    "pipeline": self.name,
                    "fingerprint": ctx.fingerprint.as_str(),
                    "run_id": run_id.to_string(),
                })),
            )
            .await;

        let mut steps = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            if !step.precondition(ctx) {
                debug!(step = step.name(), fingerprint = %ctx.fingerprint, "Step skipped");
                self.sink
                    .emit(
                        "step.skipped",
                        Some(serde_json::json!({
                            "step": step.name(),
                            "fingerprint": ctx.fingerprint.as_str(),
                        })),
                    )
                    .await;
                steps.push(StepReport {
                    name: step.name().to_string(),
                    status: StepStatus::Skipped,
                });
                continue;
            }

            if let Err(err) = self.executor.run(ctx, step.as_ref()).await {
                warn!(
                    pipeline = %self.name,
                    fingerprint = %ctx.fingerprint,
                    step = step.name(),
                    error = %err,
                    "Pipeline failed"
                );
                self.sink
                    .emit(
                        "pipeline.failed",
                        Some(serde_json::json!({
                            "pipeline": self.name,
                            "fingerprint": ctx.fingerprint.as_str(),
                            "run_id": run_id.to_string(),
                            "step": step.name(),
                            "error": err.to_string(),
                        })),
                    )
                    .await;
                return Err(err);
            }

            steps.push(StepReport {
                name: step.name().to_string(),
                status: StepStatus::Completed,
            });
        }

        let report = RunReport {
            run_id,
            pipeline: self.name.clone(),
            fingerprint: ctx.fingerprint.clone(),
            steps,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            pipeline = %self.name,
            fingerprint = %ctx.fingerprint,
            %run_id,
            completed = report.completed_steps().len(),
            duration_ms = report.duration_ms(),
            "Pipeline completed"
        );
        self.sink
            .emit(
                "pipeline.completed",
                Some(serde_json::json!({
                    "pipeline": self.name,
                    "fingerprint": ctx.fingerprint.as_str(),
                    "run_id": run_id.to_string(),
                    "duration_ms": report.duration_ms(),
                })),
            )
            .await;
        Ok(report)
    }

    /// Runs many items, at most [`Self::max_concurrency`] at a time.
    ///
    /// Outcomes are returned in input order. One item failing does not stop
    /// the others. Items share no state except their fingerprint's action
    /// log, so a fingerprint repeated within one batch is not run again: the
    /// later copies fail with [`IngestError::Config`] and their context is
    /// returned untouched.
    pub async fn run_batch(&self, contexts: Vec<PipelineContext>) -> Vec<BatchOutcome> {
        let mut seen = HashSet::new();
        let items: Vec<_> = contexts
            .into_iter()
            .map(|context| {
                let repeated = !seen.insert(context.fingerprint.clone());
                (context, repeated)
            })
            .collect();

        stream::iter(items)
            .map(|(mut context, repeated)| async move {
                let result = if repeated {
                    warn!(fingerprint = %context.fingerprint, "Fingerprint repeated in batch; not run");
                    Err(IngestError::config(format!(
                        "fingerprint '{}' appears more than once in the batch",
                        context.fingerprint
                    )))
                } else {
                    self.run(&mut context).await
                };
                BatchOutcome { context, result }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await
    }
}
