//! Test doubles and assertions for ingestflow pipelines.
//!
//! This module provides:
//! - Scripted transcript fetchers
//! - Assertions over an item's action log

mod assertions;
mod mocks;

pub use assertions::{assert_completed, assert_failed, assert_no_entries, assert_pending};
pub use mocks::{FailingTranscriptFetcher, SlowTranscriptFetcher, StaticTranscriptFetcher};
