//! Plan command.
//!
//! Shows what a run on a branch would do without executing anything.

use serde_json::json;
use std::path::Path;

use crate::cli::{base_dir, output};
use crate::core::config::Config;
use crate::core::env::EnvSet;
use crate::core::sequencer::Sequencer;
use crate::core::trigger;
use crate::error::Result;

/// Print the plan for `branch`.
pub fn execute(config_path: &Path, branch: Option<&str>, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let branch = trigger::resolve_branch(branch, base_dir(config_path))?;

    let sequencer = Sequencer::from_config(&config, &EnvSet::new());
    let plan = sequencer.plan(&branch);
    let triggered = sequencer.is_triggered(&branch);

    if json {
        let doc = json!({
            "branch": branch,
            "designated_branch": sequencer.designated_branch(),
            "triggered": triggered,
            "stages": plan,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    output::section(&format!("Plan for {}", branch));
    if !triggered {
        output::dimmed(&format!("branch '{}' does not trigger a run", branch));
        return Ok(());
    }

    for stage in &plan {
        if stage.will_run {
            let mut notes = Vec::new();
            if !stage.needs.is_empty() {
                notes.push(format!("waits for {}", stage.needs.join(", ")));
            }
            if !stage.secrets.is_empty() {
                notes.push(format!("secrets {}", stage.secrets.join(", ")));
            }
            if stage.allow_failure {
                notes.push("non-blocking".to_string());
            }

            if notes.is_empty() {
                output::list_item(&output::key(&stage.name));
            } else {
                output::list_item(&format!("{}  ({})", output::key(&stage.name), notes.join("; ")));
            }
        } else {
            let reason = stage.reason.as_deref().unwrap_or_default();
            output::dimmed(&format!("  - {} skipped: {}", stage.name, reason));
        }
    }

    Ok(())
}
