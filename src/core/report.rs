//! Run reports.
//!
//! What happened to each stage of a run, and how the run ended.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::types::{BranchName, StageName};

/// Result of a single stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Passed,
    /// Failed and stopped the run
    Failed { reason: String },
    /// Failed, but the stage is non-blocking
    FailedAllowed { reason: String },
    /// Not executed because a gate was closed; not a failure
    Skipped { reason: String },
    /// Never reached because an earlier stage failed or the run was not triggered
    NotRun,
}

impl StageStatus {
    /// Whether the stage's action was executed.
    pub fn executed(&self) -> bool {
        matches!(
            self,
            Self::Passed | Self::Failed { .. } | Self::FailedAllowed { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed { .. } => "failed",
            Self::FailedAllowed { .. } => "failed (allowed)",
            Self::Skipped { .. } => "skipped",
            Self::NotRun => "not run",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub name: StageName,
    #[serde(flatten)]
    pub status: StageStatus,
    pub duration_ms: u64,
}

/// How the run as a whole ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed { stage: StageName },
    /// The branch is not one of the trigger branches
    NotTriggered,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub branch: BranchName,
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    pub stages: Vec<StageOutcome>,
}

impl RunReport {
    /// A run counts as successful unless a blocking stage failed.
    pub fn is_success(&self) -> bool {
        !matches!(self.status, RunStatus::Failed { .. })
    }

    pub fn failed_stage(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Failed { stage } => Some(stage),
            _ => None,
        }
    }

    /// Names of stages whose action ran, in order.
    pub fn executed(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.status.executed())
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.stages.iter().find(|s| s.name == stage)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.stages.iter().map(|s| s.duration_ms).sum()
    }
}
