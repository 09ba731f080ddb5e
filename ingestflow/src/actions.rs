//! Action vocabulary.
//!
//! An [`Action`] names one phase of one processing operation. Its
//! [`label`](Action::label) is the stable key used in the action log; the
//! user-facing wording lives separately in [`crate::display`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A logical processing operation performed by a pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetch the transcript of a video referenced in the content.
    FetchTranscript,
    /// Merge a fetched transcript into the content.
    AppendTranscript,
}

impl Operation {
    /// Every operation, in pipeline order.
    pub const ALL: [Self; 2] = [Self::FetchTranscript, Self::AppendTranscript];

    /// Base label shared by the three phases.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FetchTranscript => "fetch_transcript",
            Self::AppendTranscript => "append_transcript",
        }
    }

    /// The start-phase action.
    #[must_use]
    pub const fn start(self) -> Action {
        Action::new(self, Phase::Start)
    }

    /// The done-phase action.
    #[must_use]
    pub const fn done(self) -> Action {
        Action::new(self, Phase::Done)
    }

    /// The error-phase action.
    #[must_use]
    pub const fn error(self) -> Action {
        Action::new(self, Phase::Error)
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.key() == key)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The lifecycle phase of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The operation has started.
    Start,
    /// The operation finished successfully.
    Done,
    /// The operation failed.
    Error,
}

impl Phase {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Start => "",
            Self::Done => "_done",
            Self::Error => "_error",
        }
    }
}

/// One phase of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    /// The operation.
    pub operation: Operation,
    /// The phase.
    pub phase: Phase,
}

impl Action {
    /// Creates an action.
    #[must_use]
    pub const fn new(operation: Operation, phase: Phase) -> Self {
        Self { operation, phase }
    }

    /// Stable log key, e.g. `fetch_transcript_done`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{}{}", self.operation.key(), self.phase.suffix())
    }

    /// Parses a log key back into an action.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        for phase in [Phase::Done, Phase::Error] {
            if let Some(key) = label.strip_suffix(phase.suffix()) {
                if let Some(op) = Operation::from_key(key) {
                    return Some(Self::new(op, phase));
                }
            }
        }
        Operation::from_key(label).map(Operation::start)
    }

    /// The start action of the same operation.
    #[must_use]
    pub const fn as_start(self) -> Self {
        self.operation.start()
    }

    /// Returns true for start-phase actions.
    #[must_use]
    pub fn is_start(self) -> bool {
        self.phase == Phase::Start
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operation.key(), self.phase.suffix())
    }
}

/// Error returned when a label names no known action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown action label: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownAction(s.to_string()))
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Operation::FetchTranscript.start().label(), "fetch_transcript");
        assert_eq!(Operation::FetchTranscript.done().label(), "fetch_transcript_done");
        assert_eq!(Operation::FetchTranscript.error().label(), "fetch_transcript_error");
        assert_eq!(Operation::AppendTranscript.done().to_string(), "append_transcript_done");
    }

    #[test]
    fn test_from_label_every_action() {
        for op in Operation::ALL {
            for action in [op.start(), op.done(), op.error()] {
                assert_eq!(Action::from_label(&action.label()), Some(action));
            }
        }
    }

    #[test]
    fn test_from_label_unknown() {
        assert_eq!(Action::from_label("summarize"), None);
        assert_eq!(Action::from_label("fetch_transcript_retry"), None);
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_as_start() {
        let done = Operation::AppendTranscript.done();
        assert_eq!(done.as_start(), Operation::AppendTranscript.start());
        assert!(!done.is_start());
        assert!(done.as_start().is_start());
    }

    #[test]
    fn test_serde_uses_label() {
        let json = serde_json::to_string(&Operation::FetchTranscript.error()).unwrap();
        assert_eq!(json, "\"fetch_transcript_error\"");

        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Operation::FetchTranscript.error());

        assert!(serde_json::from_str::<Action>("\"nope\"").is_err());
    }
}
