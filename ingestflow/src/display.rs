//! User-facing wording for action log entries.

use crate::actions::{Action, Operation, Phase};

/// Phrase shown in the log viewer for a known action.
#[must_use]
pub const fn display_action(action: Action) -> &'static str {
    match (action.operation, action.phase) {
        (Operation::FetchTranscript, Phase::Start) => "Fetching YouTube transcript",
        (Operation::FetchTranscript, Phase::Done) => "YouTube transcript fetched",
        (Operation::FetchTranscript, Phase::Error) => "Failed to fetch YouTube transcript",
        (Operation::AppendTranscript, Phase::Start) => "Adding transcript to note",
        (Operation::AppendTranscript, Phase::Done) => "Transcript added to note",
        (Operation::AppendTranscript, Phase::Error) => "Failed to add transcript to note",
    }
}

/// Maps a raw log label to display text.
///
/// Labels this build does not know (written by a newer version, say) are
/// returned unchanged.
#[must_use]
pub fn display_text(label: &str) -> String {
    Action::from_label(label).map_or_else(|| label.to_string(), |a| display_action(a).to_string())
}
