//! Step trait and implementations.
//!
//! A step is a descriptor: an [`Operation`] naming its action pair, a
//! precondition, and an async effect on the [`PipelineContext`]. Steps record
//! their own completion; the executor records start and error.

mod reference;
mod transcript;

pub use reference::ReferenceExtractor;
pub use transcript::{AppendTranscriptStep, FetchTranscriptStep};

use async_trait::async_trait;
use std::fmt::Debug;

use crate::actions::{Action, Operation};
use crate::context::PipelineContext;
use crate::errors::Result;

/// Trait for pipeline steps.
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// Returns the name of the step.
    fn name(&self) -> &str;

    /// The operation whose actions this step logs.
    fn operation(&self) -> Operation;

    /// Action logged when the step starts.
    fn start_action(&self) -> Action {
        self.operation().start()
    }

    /// Action an error is filed under.
    fn error_action(&self) -> Action {
        self.operation().error()
    }

    /// Whether the step has anything to do for this context.
    ///
    /// A step whose precondition is unmet is skipped without logging.
    fn precondition(&self, _ctx: &PipelineContext) -> bool {
        true
    }

    /// Executes the step.
    ///
    /// Implementations call [`PipelineContext::complete_action`] once their
    /// unit of work has finished.
    async fn run(&self, ctx: &mut PipelineContext) -> Result<()>;
}

/// A step built from two closures.
pub struct FnStep<P, F>
where
    P: Fn(&PipelineContext) -> bool + Send + Sync,
    F: Fn(&mut PipelineContext) -> Result<()> + Send + Sync,
{
    name: String,
    operation: Operation,
    precondition: P,
    func: F,
}

impl<F> FnStep<fn(&PipelineContext) -> bool, F>
where
    F: Fn(&mut PipelineContext) -> Result<()> + Send + Sync,
{
    /// Creates a step that always runs.
    pub fn new(name: impl Into<String>, operation: Operation, func: F) -> Self {
        Self {
            name: name.into(),
            operation,
            precondition: |_| true,
            func,
        }
    }
}

impl<P, F> FnStep<P, F>
where
    P: Fn(&PipelineContext) -> bool + Send + Sync,
    F: Fn(&mut PipelineContext) -> Result<()> + Send + Sync,
{
    /// Creates a step guarded by `precondition`.
    pub fn guarded(name: impl Into<String>, operation: Operation, precondition: P, func: F) -> Self {
        Self {
            name: name.into(),
            operation,
            precondition,
            func,
        }
    }
}

impl<P, F> Debug for FnStep<P, F>
where
    P: Fn(&PipelineContext) -> bool + Send + Sync,
    F: Fn(&mut PipelineContext) -> Result<()> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStep")
            .field("name", &self.name)
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<P, F> Step for FnStep<P, F>
where
    P: Fn(&PipelineContext) -> bool + Send + Sync,
    F: Fn(&mut PipelineContext) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn operation(&self) -> Operation {
        self.operation
    }

    fn precondition(&self, ctx: &PipelineContext) -> bool {
        (self.precondition)(ctx)
    }

    async fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        (self.func)(ctx)
    }
}
