//! Pipeline builder with validation.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::Pipeline;
use crate::config::{PipelineConfig, DEFAULT_STEP_TIMEOUT};
use crate::errors::{IngestError, Result};
use crate::events::{EventSink, NoOpEventSink};
use crate::executor::StepExecutor;
use crate::steps::Step;

/// Builder for creating validated pipelines.
pub struct PipelineBuilder {
    name: String,
    steps: Vec<Arc<dyn Step>>,
    timeout: Option<Duration>,
    max_concurrency: usize,
    sink: Arc<dyn EventSink>,
    config_error: Option<IngestError>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("timeout", &self.timeout)
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}

impl PipelineBuilder {
    /// Creates a new pipeline builder with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            timeout: Some(DEFAULT_STEP_TIMEOUT),
            max_concurrency: PipelineConfig::default().max_concurrency,
            sink: Arc::new(NoOpEventSink),
            config_error: None,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of steps added so far.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Appends a step.
    #[must_use]
    pub fn step(self, step: impl Step + 'static) -> Self {
        self.shared_step(Arc::new(step))
    }

    /// Appends a shared step.
    #[must_use]
    pub fn shared_step(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    /// Applies the timeout and concurrency of a configuration.
    ///
    /// An invalid configuration is reported by [`Self::build`].
    #[must_use]
    pub fn with_config(mut self, config: &PipelineConfig) -> Self {
        match config.validate().and_then(|()| config.step_timeout()) {
            Ok(timeout) => {
                self.timeout = timeout;
                self.max_concurrency = config.max_concurrency;
            }
            Err(err) => self.config_error = Some(err),
        }
        self
    }

    /// Sets the per-step time budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the batch concurrency.
    #[must_use]
    pub const fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n;
        self
    }

    /// Sets the event sink shared by the pipeline and its executor.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validates and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, when there are no steps, when two
    /// steps share a name, or when the concurrency is zero.
    pub fn build(self) -> Result<Pipeline> {
        if let Some(err) = self.config_error {
            return Err(err);
        }

        if self.steps.is_empty() {
            return Err(IngestError::config(format!(
                "Pipeline '{}' has no steps",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name()) {
                return Err(IngestError::config(format!(
                    "Pipeline '{}' has two steps named '{}'",
                    self.name,
                    step.name()
                )));
            }
        }

        if self.max_concurrency == 0 {
            return Err(IngestError::config("max_concurrency must be at least 1"));
        }

        let executor = StepExecutor::new()
            .with_timeout(self.timeout)
            .with_event_sink(Arc::clone(&self.sink));

        Ok(Pipeline {
            name: self.name,
            steps: self.steps,
            executor,
            sink: self.sink,
            max_concurrency: self.max_concurrency,
        })
    }
}
