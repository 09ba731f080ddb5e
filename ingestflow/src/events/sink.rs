//! Where pipeline lifecycle events go.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn, Level};

/// Receives lifecycle events from a pipeline and its step executor.
///
/// A sink observes a run and never takes part in it: neither method may
/// fail or panic.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers an event from async code.
    ///
    /// The pipeline awaits this for `pipeline.*` and `step.skipped` events.
    /// Defaults to [`Self::try_emit`].
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.try_emit(event_type, data);
    }

    /// Delivers an event without awaiting; used inside the step executor.
    fn try_emit(&self, event_type: &str, data: Option<Value>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn try_emit(&self, _event_type: &str, _data: Option<Value>) {}
}

/// Turns events into `tracing` records.
///
/// `*.failed` events are always logged at `WARN`; everything else at the
/// sink's level (`DEBUG` by default, since the runner already logs run
/// boundaries at `INFO`).
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl LoggingEventSink {
    /// Creates a sink logging routine events at `level`.
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    /// Level used for events that are not failures.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }
}

fn str_field<'a>(data: Option<&'a Value>, key: &str) -> &'a str {
    data.and_then(|d| d.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
}

impl EventSink for LoggingEventSink {
    fn try_emit(&self, event_type: &str, data: Option<Value>) {
        let data = data.as_ref();
        let fingerprint = str_field(data, "fingerprint");
        let step = str_field(data, "step");

        if event_type.ends_with(".failed") {
            let error = str_field(data, "error");
            warn!(event = event_type, fingerprint, step, error, "Pipeline event");
        } else if self.level == Level::TRACE || self.level == Level::DEBUG {
            debug!(event = event_type, fingerprint, step, "Pipeline event");
        } else {
            info!(event = event_type, fingerprint, step, "Pipeline event");
        }
    }
}

/// An event captured by [`CollectingEventSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedEvent {
    /// Event type, e.g. `step.failed`.
    pub event_type: String,
    /// Payload as emitted.
    pub data: Option<Value>,
    /// When the sink received it.
    pub received_at: DateTime<Utc>,
}

impl RecordedEvent {
    /// Looks up a string field of the payload.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<RecordedEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().clone()
    }

    /// Event types in arrival order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|e| e.event_type.clone()).collect()
    }

    /// Events whose type starts with `prefix`.
    #[must_use]
    pub fn events_of_type(&self, prefix: &str) -> Vec<RecordedEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of events received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// True if nothing has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Forgets all events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventSink for CollectingEventSink {
    fn try_emit(&self, event_type: &str, data: Option<Value>) {
        self.events.write().push(RecordedEvent {
            event_type: event_type.to_string(),
            data,
            received_at: Utc::now(),
        });
    }
}
