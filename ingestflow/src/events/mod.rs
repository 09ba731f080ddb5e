//! Lifecycle events for pipeline runs.
//!
//! The pipeline and step executor report what they do through an injected
//! [`EventSink`]. Event types used by the crate:
//!
//! | event type           | emitted when                              |
//! |----------------------|-------------------------------------------|
//! | `pipeline.started`   | a run begins                              |
//! | `pipeline.completed` | every step completed or was skipped       |
//! | `pipeline.failed`    | a step failed and the run was aborted     |
//! | `step.started`       | the executor logged a step's start action |
//! | `step.completed`     | a step returned successfully              |
//! | `step.skipped`       | a step's precondition was not met         |
//! | `step.failed`        | a step failed                             |

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};
