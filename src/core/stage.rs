//! Stages and their actions.
//!
//! A stage pairs a label with an opaque action. The sequencer only observes
//! whether the action succeeded.

use std::collections::BTreeMap;
use std::process::Stdio;
use tracing::debug;

use crate::core::config::{ServiceConfig, StageConfig};
use crate::core::env::EnvSet;
use crate::core::readiness::Service;
use crate::core::secrets::Secret;
use crate::core::shell;
use crate::core::types::{SecretName, ShellCommand, StageName};
use crate::error::{Result, StageError};

/// What an action gets to see when it runs.
pub struct StageContext<'a> {
    /// Triggering branch
    pub branch: &'a str,
    /// Assembled environment set
    pub env: &'a EnvSet,
    /// Secrets this stage declared, resolved
    pub secrets: &'a [Secret],
    /// Pipeline secrets this stage did not declare
    pub withheld: &'a [SecretName],
    /// Tool output goes to stderr instead of stdout
    pub stdout_to_stderr: bool,
}

/// Work delegated to an external tool.
pub trait Action {
    /// Run to completion.
    ///
    /// # Errors
    ///
    /// Any error marks the stage as failed.
    fn run(&self, ctx: &StageContext<'_>) -> Result<()>;
}

/// Runs a command line through the platform shell with inherited stdio.
///
/// When the context asks for it, the child's stdout is attached to our
/// stderr so stdout carries nothing but deckhand's own output.
#[derive(Debug, Clone)]
pub struct ShellAction {
    command: ShellCommand,
    env: BTreeMap<String, String>,
}

impl ShellAction {
    pub fn new(command: impl Into<ShellCommand>) -> Self {
        Self {
            command: command.into(),
            env: BTreeMap::new(),
        }
    }

    /// Add stage-level variables, applied over the environment set.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Action for ShellAction {
    fn run(&self, ctx: &StageContext<'_>) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(StageError::EmptyCommand.into());
        }

        let mut cmd = shell::command(&self.command);
        cmd.stdin(Stdio::inherit())
            .envs(ctx.env.iter())
            .envs(&self.env)
            .env("DECKHAND_BRANCH", ctx.branch);
        if ctx.stdout_to_stderr {
            cmd.stdout(Stdio::from(std::io::stderr()));
        }

        // Undeclared secrets may still sit in the inherited process env.
        for name in ctx.withheld {
            cmd.env_remove(name);
        }
        for secret in ctx.secrets {
            cmd.env(secret.name(), secret.expose());
        }

        debug!(command = %self.command, "spawning");
        let status = cmd.status().map_err(|source| StageError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(StageError::Exited {
                command: self.command.clone(),
                code,
            }
            .into()),
            None => Err(StageError::Terminated {
                command: self.command.clone(),
            }
            .into()),
        }
    }
}

/// One named unit of delegated work.
pub struct Stage {
    pub name: StageName,
    pub action: Box<dyn Action>,
    /// Runs only on the designated branch
    pub gated: bool,
    /// Failure does not stop the run
    pub allow_failure: bool,
    /// Awaited before the action runs
    pub needs: Vec<Service>,
    /// Secret names injected into this stage
    pub secrets: Vec<SecretName>,
}

impl Stage {
    /// A blocking, ungated stage with no services or secrets.
    pub fn new(name: impl Into<StageName>, action: Box<dyn Action>) -> Self {
        Self {
            name: name.into(),
            action,
            gated: false,
            allow_failure: false,
            needs: Vec::new(),
            secrets: Vec::new(),
        }
    }

    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn allow_failure(mut self) -> Self {
        self.allow_failure = true;
        self
    }

    pub fn needs(mut self, service: Service) -> Self {
        self.needs.push(service);
        self
    }

    pub fn secret(mut self, name: impl Into<SecretName>) -> Self {
        self.secrets.push(name.into());
        self
    }

    /// Build a shell-backed stage from its config entry.
    ///
    /// `services` must contain every name in `config.needs`; validated
    /// configs guarantee this, and unknown names are skipped otherwise.
    pub fn from_config(
        config: &StageConfig,
        services: &BTreeMap<String, ServiceConfig>,
        env: &EnvSet,
    ) -> Self {
        let action = ShellAction::new(config.run.as_str()).with_env(config.env.clone());
        let needs = config
            .needs
            .iter()
            .filter_map(|name| {
                services
                    .get(name)
                    .map(|svc| Service::from_config(name, svc, env))
            })
            .collect();

        Self {
            name: config.name.clone(),
            action: Box::new(action),
            gated: config.gated,
            allow_failure: config.allow_failure,
            needs,
            secrets: config.secrets.clone(),
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("gated", &self.gated)
            .field("allow_failure", &self.allow_failure)
            .field("needs", &self.needs.iter().map(|s| &s.name).collect::<Vec<_>>())
            .field("secrets", &self.secrets)
            .finish()
    }
}
