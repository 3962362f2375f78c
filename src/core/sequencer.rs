//! Stage sequencing.
//!
//! Runs stages strictly in order, stopping at the first blocking failure.
//! Gated stages run only when the triggering branch is the designated one;
//! a closed gate skips the stage without failing the run.

use chrono::Utc;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::env::EnvSet;
use crate::core::report::{RunReport, RunStatus, StageOutcome, StageStatus};
use crate::core::secrets::SecretStore;
use crate::core::stage::{Stage, StageContext};
use crate::core::trigger;
use crate::core::types::{BranchName, SecretName};
use crate::error::Result;

/// Receives progress while a run is underway.
pub trait Reporter {
    fn stage_started(&mut self, _stage: &Stage) {}
    fn stage_finished(&mut self, _outcome: &StageOutcome) {}
}

impl Reporter for () {}

/// What `plan` expects to happen to a stage, before anything runs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PlannedStage {
    pub name: String,
    pub will_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub needs: Vec<String>,
    pub secrets: Vec<SecretName>,
    pub allow_failure: bool,
}

/// An ordered pipeline of stages.
#[derive(Debug)]
pub struct Sequencer {
    stages: Vec<Stage>,
    designated_branch: BranchName,
    triggers: Vec<BranchName>,
    stdout_to_stderr: bool,
}

impl Sequencer {
    /// Empty pipeline; any branch triggers it.
    pub fn new(designated_branch: impl Into<BranchName>) -> Self {
        Self {
            stages: Vec::new(),
            designated_branch: designated_branch.into(),
            triggers: Vec::new(),
            stdout_to_stderr: false,
        }
    }

    /// Restrict runs to pushes on `branches`.
    pub fn with_triggers(mut self, branches: Vec<BranchName>) -> Self {
        self.triggers = branches;
        self
    }

    /// Send stage output to stderr, keeping stdout for a machine-readable
    /// report.
    pub fn with_stdout_to_stderr(mut self) -> Self {
        self.stdout_to_stderr = true;
        self
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Build the pipeline described by `config`. Probes run with `env`.
    pub fn from_config(config: &Config, env: &EnvSet) -> Self {
        let stages = config
            .stages
            .iter()
            .map(|s| Stage::from_config(s, &config.services, env))
            .collect();

        Self {
            stages,
            designated_branch: config.pipeline.designated_branch.clone(),
            triggers: config.pipeline.branches.clone(),
            stdout_to_stderr: false,
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn designated_branch(&self) -> &str {
        &self.designated_branch
    }

    /// Whether a push to `branch` starts a run at all.
    pub fn is_triggered(&self, branch: &str) -> bool {
        self.triggers.is_empty() || trigger::is_triggered(branch, &self.triggers)
    }

    /// Every secret any stage declares.
    pub fn declared_secrets(&self) -> BTreeSet<SecretName> {
        self.stages
            .iter()
            .flat_map(|s| s.secrets.iter().cloned())
            .collect()
    }

    fn gate_reason(&self, stage: &Stage, branch: &str) -> Option<String> {
        if stage.gated && branch != self.designated_branch {
            Some(format!(
                "branch '{}' is not '{}'",
                branch, self.designated_branch
            ))
        } else {
            None
        }
    }

    /// Describe what a run on `branch` would do, assuming every stage passes.
    pub fn plan(&self, branch: &str) -> Vec<PlannedStage> {
        let triggered = self.is_triggered(branch);

        self.stages
            .iter()
            .map(|stage| {
                let reason = if triggered {
                    self.gate_reason(stage, branch)
                } else {
                    Some(format!("branch '{}' does not trigger a run", branch))
                };
                PlannedStage {
                    name: stage.name.clone(),
                    will_run: reason.is_none(),
                    reason,
                    needs: stage.needs.iter().map(|s| s.name.clone()).collect(),
                    secrets: stage.secrets.clone(),
                    allow_failure: stage.allow_failure,
                }
            })
            .collect()
    }

    /// Run every stage for a push to `branch`.
    ///
    /// Stage failures are recorded in the report rather than returned, so
    /// the caller always gets a complete account of the run.
    pub fn run(
        &self,
        branch: &str,
        env: &EnvSet,
        secrets: &SecretStore,
        reporter: &mut dyn Reporter,
    ) -> RunReport {
        let started_at = Utc::now();

        if !self.is_triggered(branch) {
            info!(branch, "branch does not trigger a run");
            return RunReport {
                branch: branch.to_string(),
                started_at,
                status: RunStatus::NotTriggered,
                stages: self.stages.iter().map(|s| not_run(&s.name)).collect(),
            };
        }

        let declared = self.declared_secrets();
        let mut stages = Vec::with_capacity(self.stages.len());
        let mut failed: Option<String> = None;

        for stage in &self.stages {
            if failed.is_some() {
                stages.push(not_run(&stage.name));
                continue;
            }

            if let Some(reason) = self.gate_reason(stage, branch) {
                info!(stage = %stage.name, %reason, "stage skipped");
                let outcome = StageOutcome {
                    name: stage.name.clone(),
                    status: StageStatus::Skipped { reason },
                    duration_ms: 0,
                };
                reporter.stage_finished(&outcome);
                stages.push(outcome);
                continue;
            }

            reporter.stage_started(stage);
            info!(stage = %stage.name, "stage started");
            let start = Instant::now();

            let status = match self.execute(stage, branch, env, secrets, &declared) {
                Ok(()) => StageStatus::Passed,
                Err(e) if stage.allow_failure => {
                    info!(stage = %stage.name, error = %e, "non-blocking stage failed");
                    StageStatus::FailedAllowed {
                        reason: e.to_string(),
                    }
                }
                Err(e) => {
                    info!(stage = %stage.name, error = %e, "stage failed");
                    failed = Some(stage.name.clone());
                    StageStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            let outcome = StageOutcome {
                name: stage.name.clone(),
                status,
                duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            };
            debug!(
                stage = %outcome.name,
                status = outcome.status.label(),
                duration_ms = outcome.duration_ms,
                "stage finished"
            );
            reporter.stage_finished(&outcome);
            stages.push(outcome);
        }

        let status = match failed {
            Some(stage) => RunStatus::Failed { stage },
            None => RunStatus::Succeeded,
        };

        RunReport {
            branch: branch.to_string(),
            started_at,
            status,
            stages,
        }
    }

    /// Resolve secrets, wait for services, then run the action.
    fn execute(
        &self,
        stage: &Stage,
        branch: &str,
        env: &EnvSet,
        secrets: &SecretStore,
        declared: &BTreeSet<SecretName>,
    ) -> Result<()> {
        let resolved = secrets.resolve(&stage.secrets)?;
        let withheld: Vec<SecretName> = declared
            .iter()
            .filter(|name| !stage.secrets.contains(name))
            .cloned()
            .collect();

        for service in &stage.needs {
            let attempts = service.wait()?;
            debug!(
                stage = %stage.name,
                service = %service.name,
                attempts,
                "dependency ready"
            );
        }

        stage.action.run(&StageContext {
            branch,
            env,
            secrets: &resolved,
            withheld: &withheld,
            stdout_to_stderr: self.stdout_to_stderr,
        })
    }
}

fn not_run(name: &str) -> StageOutcome {
    StageOutcome {
        name: name.to_string(),
        status: StageStatus::NotRun,
        duration_ms: 0,
    }
}
