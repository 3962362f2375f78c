//! Triggering branch resolution.

use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::core::constants;
use crate::core::types::BranchName;
use crate::error::{Result, TriggerError};

/// Resolve the branch a run was triggered by.
///
/// Order: `explicit` (the `--branch` flag or `DECKHAND_BRANCH`), the CI
/// variables in [`constants::BRANCH_ENV_VARS`], then the checked-out branch
/// of the git repository at `dir`.
pub fn resolve_branch(explicit: Option<&str>, dir: &Path) -> Result<BranchName> {
    resolve_branch_with(explicit, |name| std::env::var(name).ok(), || git_head(dir))
}

/// [`resolve_branch`] with injectable lookups.
pub fn resolve_branch_with<F, G>(explicit: Option<&str>, lookup: F, git: G) -> Result<BranchName>
where
    F: Fn(&str) -> Option<String>,
    G: FnOnce() -> Result<Option<String>>,
{
    if let Some(branch) = explicit.and_then(normalize) {
        debug!(branch = %branch, source = "flag", "branch resolved");
        return Ok(branch);
    }

    for var in constants::BRANCH_ENV_VARS {
        if let Some(branch) = lookup(var).as_deref().and_then(normalize) {
            debug!(branch = %branch, source = var, "branch resolved");
            return Ok(branch);
        }
    }

    match git()?.as_deref().map(str::trim) {
        Some("HEAD") => Err(TriggerError::DetachedHead.into()),
        Some(head) => match normalize(head) {
            Some(branch) => {
                debug!(branch = %branch, source = "git", "branch resolved");
                Ok(branch)
            }
            None => Err(TriggerError::Undetermined.into()),
        },
        None => Err(TriggerError::Undetermined.into()),
    }
}

/// Whether a push to `branch` triggers a run.
pub fn is_triggered(branch: &str, triggers: &[BranchName]) -> bool {
    triggers.iter().any(|t| t == branch)
}

fn normalize(raw: &str) -> Option<BranchName> {
    let branch = raw.trim();
    let branch = branch.strip_prefix("refs/heads/").unwrap_or(branch);
    if branch.is_empty() {
        None
    } else {
        Some(branch.to_string())
    }
}

/// Name of the branch checked out at `dir`, if git is available and `dir`
/// is inside a work tree.
fn git_head(dir: &Path) -> Result<Option<String>> {
    if which::which("git").is_err() {
        debug!("git not found on PATH");
        return Ok(None);
    }

    let output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(dir)
        .output()?;

    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
}
