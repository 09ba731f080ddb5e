//! Run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::context::Fingerprint;

/// How a step ended in a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The step ran and returned successfully.
    Completed,
    /// The step's precondition was not met.
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Step name.
    pub name: String,
    /// Step status.
    pub status: StepStatus,
}

/// Summary of one successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Pipeline name.
    pub pipeline: String,
    /// Item processed.
    pub fingerprint: Fingerprint,
    /// Per-step outcomes, in execution order.
    pub steps: Vec<StepReport>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Status of a named step.
    #[must_use]
    pub fn status_of(&self, step: &str) -> Option<StepStatus> {
        self.steps.iter().find(|s| s.name == step).map(|s| s.status)
    }

    /// Names of the steps that ran.
    #[must_use]
    pub fn completed_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Returns true if every step was skipped.
    #[must_use]
    pub fn nothing_to_do(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Skipped)
    }

    /// Run duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
