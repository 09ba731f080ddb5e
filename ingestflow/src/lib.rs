//! # Ingestflow
//!
//! A step-tracked content ingestion pipeline.
//!
//! Each content item is identified by a [`Fingerprint`](context::Fingerprint)
//! and owns an action log. Steps record when they start, when they finish and
//! when they fail, so a note's processing history can be shown to a user or
//! resumed after a crash.
//!
//! The bundled transcript pipeline:
//!
//! - finds an embedded YouTube link in the content
//! - fetches the video's transcript
//! - appends the transcript to the content under a heading
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ingestflow::prelude::*;
//!
//! let config = PipelineConfig::default();
//! let records = config.records.build()?;
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let mut ctx = PipelineContext::from_content(note, records.clone());
//! let report = pipeline.run(&mut ctx).await?;
//!
//! for entry in records.entries(ctx.fingerprint.as_str()) {
//!     println!("{}", display_action(entry.action));
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod actions;
pub mod cancellation;
pub mod config;
pub mod context;
pub mod display;
pub mod errors;
pub mod events;
pub mod executor;
pub mod fetch;
pub mod observability;
pub mod pipeline;
pub mod records;
pub mod steps;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::actions::{Action, Operation, Phase};
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{FetchConfig, LoggingConfig, PipelineConfig, RecordStoreConfig};
    pub use crate::context::{Fingerprint, PipelineContext};
    pub use crate::display::{display_action, display_text};
    pub use crate::errors::{ErrorRecord, IngestError, Result};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::executor::StepExecutor;
    #[cfg(feature = "http")]
    pub use crate::fetch::HttpTranscriptFetcher;
    pub use crate::fetch::{Transcript, TranscriptFetcher};
    pub use crate::observability::init_logging;
    pub use crate::pipeline::{BatchOutcome, Pipeline, PipelineBuilder, RunReport, StepStatus};
    pub use crate::records::{LogEntry, RecordManager, RecordStore};
    pub use crate::steps::{
        AppendTranscriptStep, FetchTranscriptStep, FnStep, ReferenceExtractor, Step,
    };
}
