//! Context management for pipeline execution.
//!
//! This module provides:
//! - [`Fingerprint`], the per-item log partition key
//! - [`PipelineContext`], the mutable state a run threads through its steps

mod execution;
mod fingerprint;

pub use execution::PipelineContext;
pub use fingerprint::Fingerprint;
