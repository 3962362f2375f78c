//! Init command.
//!
//! Writes the default pipeline and keeps local env files out of git.

use std::path::Path;

use crate::cli::{base_dir, output};
use crate::core::config::{self, Config};
use crate::error::{ConfigError, Result};

/// Write a default configuration to `path`.
pub fn execute(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyInitialized(path.to_path_buf()).into());
    }

    let config = Config::new();
    config.save(path)?;
    config::ensure_gitignore(base_dir(path))?;

    output::success(&format!("wrote {}", path.display()));
    output::kv("stages", config.stages.len());
    output::kv("deploys", format!("from {}", config.pipeline.designated_branch));
    output::kv("triggers", config.pipeline.branches.join(", "));
    println!();
    output::dimmed("Edit the stage commands for your project, then:");
    output::list_item(&output::cmd("deckhand check"));
    output::list_item(&output::cmd("deckhand plan --branch develop"));

    Ok(())
}
