//! Step executor: uniform start/error instrumentation around one step.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::actions::Action;
use crate::context::PipelineContext;
use crate::errors::{ErrorRecord, IngestError, Result};
use crate::events::{EventSink, NoOpEventSink};
use crate::steps::Step;

/// Runs steps with start/error logging, a time budget and cancellation.
///
/// The executor never records completion; that is the step's job.
#[derive(Clone)]
pub struct StepExecutor {
    timeout: Option<Duration>,
    sink: Arc<dyn EventSink>,
}

impl Default for StepExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StepExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepExecutor")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StepExecutor {
    /// Creates an executor with no timeout and no event sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: None,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the per-step time budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The configured time budget.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Executes a step using its own action pair.
    pub async fn run(&self, ctx: &mut PipelineContext, step: &dyn Step) -> Result<()> {
        self.execute(ctx, step, step.start_action(), step.error_action())
            .await
    }

    /// Logs `start_action`, runs `step`, and on failure logs an entry under
    /// `error_action` before returning the original error.
    pub async fn execute(
        &self,
        ctx: &mut PipelineContext,
        step: &dyn Step,
        start_action: Action,
        error_action: Action,
    ) -> Result<()> {
        ctx.add_action(start_action);
        self.sink.try_emit(
            "step.started",
            Some(serde_json::json!({
                "step": step.name(),
                "fingerprint": ctx.fingerprint.as_str(),
                "action": start_action.label(),
            })),
        );

        let started = Instant::now();
        let result = self.invoke(ctx, step).await;
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(()) => {
                debug!(step = step.name(), fingerprint = %ctx.fingerprint, duration_ms, "Step completed");
                self.sink.try_emit(
                    "step.completed",
                    Some(serde_json::json!({
                        "step": step.name(),
                        "fingerprint": ctx.fingerprint.as_str(),
                        "duration_ms": duration_ms,
                    })),
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    step = step.name(),
                    fingerprint = %ctx.fingerprint,
                    error = %err,
                    "Step failed"
                );
                ctx.add_error(ErrorRecord::from_error(error_action, &err));
                self.sink.try_emit(
                    "step.failed",
                    Some(serde_json::json!({
                        "step": step.name(),
                        "fingerprint": ctx.fingerprint.as_str(),
                        "action": error_action.label(),
                        "error": err.to_string(),
                        "error_type": err.kind(),
                        "duration_ms": duration_ms,
                    })),
                );
                Err(err)
            }
        }
    }

    async fn invoke(&self, ctx: &mut PipelineContext, step: &dyn Step) -> Result<()> {
        let cancel = Arc::clone(ctx.cancellation());
        if let Some(reason) = cancel.reason() {
            return Err(IngestError::Cancelled(reason));
        }

        let timeout = self.timeout;
        let work = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, step.run(ctx))
                    .await
                    .unwrap_or_else(|_| {
                        Err(IngestError::Timeout {
                            step: step.name().to_string(),
                            seconds: limit.as_secs_f64(),
                        })
                    }),
                None => step.run(ctx).await,
            }
        };

        tokio::select! {
            result = work => result,
            reason = cancel.cancelled() => Err(IngestError::Cancelled(reason)),
        }
    }
}
