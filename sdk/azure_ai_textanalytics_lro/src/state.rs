//! Job lifecycle states and the status snapshot produced by each poll.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::handle::JobHandle;

/// Lifecycle state of a batch job, as reported by the service.
///
/// `NotStarted -> Running -> {Succeeded | Cancelled | Failed | PartiallyCompleted}`.
/// Values the SDK does not know are kept verbatim in [`OperationState::Other`]
/// and treated as terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum OperationState {
    NotStarted,
    Running,
    /// Cancellation was requested and the service has not confirmed it yet.
    Cancelling,
    Succeeded,
    Cancelled,
    Failed,
    PartiallyCompleted,
    Rejected,
    /// A state string this SDK version does not know.
    Other(String),
}

impl OperationState {
    /// `true` once the job can make no further progress.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::NotStarted | Self::Running | Self::Cancelling)
    }

    /// `true` when result pages can be fetched without a batch error.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// The wire spelling.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "notStarted",
            Self::Running => "running",
            Self::Cancelling => "cancelling",
            Self::Succeeded => "succeeded",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::PartiallyCompleted => "partiallyCompleted",
            Self::Rejected => "rejected",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for OperationState {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "notstarted" => Self::NotStarted,
            "running" => Self::Running,
            "cancelling" => Self::Cancelling,
            "succeeded" => Self::Succeeded,
            "cancelled" => Self::Cancelled,
            "failed" => Self::Failed,
            "partiallycompleted" | "partiallysucceeded" => Self::PartiallyCompleted,
            "rejected" => Self::Rejected,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl From<String> for OperationState {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task counters of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskProgress {
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub in_progress: u32,
}

/// One observation of a job, built fresh from every status response.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSnapshot {
    pub job_handle: JobHandle,
    pub state: OperationState,
    pub display_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub progress: TaskProgress,
}

impl OperationSnapshot {
    /// Shorthand for `self.state.is_terminal()`.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
