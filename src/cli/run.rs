//! Run command.
//!
//! Executes the pipeline with the assembled environment set and the secrets
//! each stage declares.

use std::path::Path;
use tracing::debug;

use crate::cli::{base_dir, context_or_detect, output};
use crate::core::config::Config;
use crate::core::env::{Context, EnvSet};
use crate::core::report::{RunReport, StageOutcome};
use crate::core::secrets::SecretStore;
use crate::core::sequencer::{Reporter, Sequencer};
use crate::core::stage::Stage;
use crate::core::trigger;
use crate::error::{Error, Result};

/// Prints a line as each stage starts and finishes.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn stage_started(&mut self, stage: &Stage) {
        output::stage_started(&stage.name);
    }

    fn stage_finished(&mut self, outcome: &StageOutcome) {
        output::stage_finished(outcome);
    }
}

/// Run the pipeline described by the configuration at `config_path`.
pub fn execute(
    config_path: &Path,
    branch: Option<&str>,
    context: Option<Context>,
    json: bool,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let base = base_dir(config_path);
    let branch = trigger::resolve_branch(branch, base)?;
    let context = context_or_detect(context);
    debug!(branch = %branch, context = %context, "starting run");

    let report = run_pipeline(&config, base, &branch, context, json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::summary(&report);
    }

    match report.failed_stage() {
        Some(stage) => Err(Error::RunFailed(stage.to_string())),
        None => Ok(()),
    }
}

fn run_pipeline(
    config: &Config,
    base: &Path,
    branch: &str,
    context: Context,
    quiet: bool,
) -> Result<RunReport> {
    // Nothing runs off a trigger branch, so inputs are never resolved.
    let empty = EnvSet::new();
    let idle = Sequencer::from_config(config, &empty);
    if !idle.is_triggered(branch) {
        return Ok(idle.run(branch, &empty, &SecretStore::new(), &mut ()));
    }

    let env = EnvSet::assemble(&config.env, context, base, |name| std::env::var(name).ok())?;
    let secrets = SecretStore::from_env(&config.declared_secrets(), &env);
    debug!(vars = env.len(), secrets = secrets.len(), "inputs resolved");

    let sequencer = Sequencer::from_config(config, &env);
    let report = if quiet {
        // stdout is reserved for the JSON report
        sequencer
            .with_stdout_to_stderr()
            .run(branch, &env, &secrets, &mut ())
    } else {
        sequencer.run(branch, &env, &secrets, &mut ConsoleReporter)
    };

    Ok(report)
}
