//! Run status shared between the runner, the scheduler and API handlers.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::types::SummaryStatistics;

/// Lifecycle state of the most recent run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Point-in-time view of the runner, replaced wholesale on every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub state: RunState,
    pub last_started_at: Option<DateTime<Local>>,
    pub last_finished_at: Option<DateTime<Local>>,
    /// Error text of the last failed run, cleared on success.
    pub last_error: Option<String>,
    pub last_summary: Option<SummaryStatistics>,
    pub runs_completed: u64,
    pub runs_failed: u64,
}

impl RunStatus {
    /// Transition into `Running`, keeping the previous results visible.
    #[must_use]
    pub fn started(&self, at: DateTime<Local>) -> Self {
        Self {
            state: RunState::Running,
            last_started_at: Some(at),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn succeeded(&self, at: DateTime<Local>, summary: SummaryStatistics) -> Self {
        Self {
            state: RunState::Succeeded,
            last_finished_at: Some(at),
            last_error: None,
            last_summary: Some(summary),
            runs_completed: self.runs_completed + 1,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn failed(&self, at: DateTime<Local>, error: String) -> Self {
        Self {
            state: RunState::Failed,
            last_finished_at: Some(at),
            last_error: Some(error),
            runs_failed: self.runs_failed + 1,
            ..self.clone()
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }
}
