//! Check command.
//!
//! Validates the configuration and reports what a run would trip over:
//! stage programs missing from PATH, required variables the environment
//! context does not define, and secrets neither the environment set nor
//! the process provides.

use std::path::Path;

use crate::cli::{base_dir, context_or_detect, output};
use crate::core::config::Config;
use crate::core::env::{Context, EnvSet};
use crate::core::secrets::SecretStore;
use crate::core::shell;
use crate::error::{Error, Result};

/// Shell builtins that never resolve through PATH.
const BUILTINS: &[&str] = &[
    ".", ":", "[", "cd", "echo", "exit", "export", "false", "set", "source", "test", "true",
];

/// Run every check, failing if any problem is found.
pub fn execute(config_path: &Path, context: Option<Context>) -> Result<()> {
    let config = Config::load(config_path)?;
    let context = context_or_detect(context);
    output::success(&format!("{} is valid", config_path.display()));

    let mut problems = check_programs(&config);
    let (env, env_problems) = check_env(&config, context, base_dir(config_path));
    problems += env_problems;
    problems += check_secrets(&config, &env);

    println!();
    if problems == 0 {
        output::success("all checks passed");
        Ok(())
    } else {
        Err(Error::CheckFailed(problems))
    }
}

fn program_available(program: &str) -> bool {
    BUILTINS.contains(&program) || which::which(program).is_ok()
}

fn check_programs(config: &Config) -> usize {
    output::section("Programs");
    let mut problems = 0;

    let commands = config
        .stages
        .iter()
        .map(|s| (s.name.as_str(), s.run.as_str()))
        .chain(
            config
                .services
                .iter()
                .map(|(name, svc)| (name.as_str(), svc.probe.as_str())),
        );

    for (owner, line) in commands {
        match shell::program(line) {
            Some(program) if program_available(program) => {
                output::success(&format!("{}: {}", owner, program))
            }
            Some(program) => {
                output::warn(&format!("{}: '{}' not found on PATH", owner, program));
                problems += 1;
            }
            None => {
                output::warn(&format!("{}: no program in '{}'", owner, line));
                problems += 1;
            }
        }
    }

    problems
}

fn check_secrets(config: &Config, env: &EnvSet) -> usize {
    output::section("Secrets");
    let declared: Vec<String> = config.declared_secrets().into_iter().collect();
    if declared.is_empty() {
        output::dimmed("no secrets declared");
        return 0;
    }

    // Same resolution as `run`, so a passing check means secrets will resolve.
    let store = SecretStore::from_env(&declared, env);
    let missing = store.missing(&declared);

    for name in &declared {
        if !missing.contains(&name.as_str()) {
            output::success(&format!("{} provided", output::key(name)));
        } else {
            let stages: Vec<&str> = config
                .stages
                .iter()
                .filter(|s| s.secrets.contains(name))
                .map(|s| s.name.as_str())
                .collect();
            output::warn(&format!(
                "{} not provided (needed by {})",
                output::key(name),
                stages.join(", ")
            ));
        }
    }

    missing.len()
}

fn check_env(config: &Config, context: Context, base: &Path) -> (EnvSet, usize) {
    output::section(&format!("Environment ({})", context));

    match EnvSet::assemble(&config.env, context, base, |name| std::env::var(name).ok()) {
        Ok(env) => {
            output::success(&format!("{} variables resolved", env.len()));
            (env, 0)
        }
        Err(e) => {
            output::warn(&e.to_string());
            (EnvSet::new(), 1)
        }
    }
}
