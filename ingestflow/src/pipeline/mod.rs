//! Pipeline building and execution.
//!
//! A [`Pipeline`] runs an ordered list of [`Step`](crate::steps::Step)s
//! against one content item, writing start, completion and error entries to
//! the item's action log. Batches of items run with bounded concurrency.

mod builder;
mod report;
mod runner;

#[cfg(test)]
mod integration_tests;

pub use builder::PipelineBuilder;
pub use report::{RunReport, StepReport, StepStatus};
pub use runner::{BatchOutcome, Pipeline};
