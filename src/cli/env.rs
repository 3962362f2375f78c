//! Env command.
//!
//! Shows which variables a context provides, never their values.

use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{base_dir, context_or_detect, output};
use crate::core::config::Config;
use crate::core::constants::MASK;
use crate::core::env::{Context, EnvSet};
use crate::error::Result;

/// Print the masked environment set for `context`.
pub fn execute(config_path: &Path, context: Option<Context>, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let context = context_or_detect(context);
    let env = EnvSet::assemble(
        &config.env,
        context,
        base_dir(config_path),
        |name| std::env::var(name).ok(),
    )?;

    if json {
        let vars: BTreeMap<&str, &str> = env.iter().map(|(k, _)| (k, MASK)).collect();
        let doc = json!({ "context": context, "variables": vars });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    output::section(&format!("Environment ({})", context));
    if env.is_empty() {
        output::dimmed("no variables");
    }
    for (name, _) in env.iter() {
        output::kv(name, MASK);
    }

    Ok(())
}
