//! Service readiness probing.
//!
//! A stage that needs an external service (the test database) blocks until
//! the service's probe succeeds, polling a bounded number of times.

use std::process::Stdio;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::ServiceConfig;
use crate::core::env::EnvSet;
use crate::core::shell;
use crate::core::types::ShellCommand;
use crate::error::{ReadinessError, Result};

/// A single readiness check.
pub trait Probe {
    /// `Ok(true)` once the service is ready, `Ok(false)` while it is not.
    ///
    /// # Errors
    ///
    /// Returns an error when the check itself cannot be performed; polling
    /// stops immediately in that case.
    fn check(&self) -> std::io::Result<bool>;
}

/// Probe that runs a shell command and treats exit status 0 as ready.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    command: ShellCommand,
    env: EnvSet,
}

impl CommandProbe {
    pub fn new(command: impl Into<ShellCommand>, env: EnvSet) -> Self {
        Self {
            command: command.into(),
            env,
        }
    }
}

impl Probe for CommandProbe {
    fn check(&self) -> std::io::Result<bool> {
        let status = shell::command(&self.command)
            .envs(self.env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(status.success())
    }
}

/// How often and how many times to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl ReadinessPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

impl From<&ServiceConfig> for ReadinessPolicy {
    fn from(config: &ServiceConfig) -> Self {
        Self::new(Duration::from_millis(config.interval_ms), config.max_attempts)
    }
}

/// A named service with its probe and polling policy.
pub struct Service {
    pub name: String,
    pub probe: Box<dyn Probe>,
    pub policy: ReadinessPolicy,
}

impl Service {
    pub fn new(name: impl Into<String>, probe: Box<dyn Probe>, policy: ReadinessPolicy) -> Self {
        Self {
            name: name.into(),
            probe,
            policy,
        }
    }

    /// Build a command-probed service from its config entry.
    pub fn from_config(name: &str, config: &ServiceConfig, env: &EnvSet) -> Self {
        Self::new(
            name,
            Box::new(CommandProbe::new(config.probe.as_str(), env.clone())),
            ReadinessPolicy::from(config),
        )
    }

    /// Block until the service is ready. See [`wait_until_ready`].
    pub fn wait(&self) -> Result<u32> {
        wait_until_ready(&self.name, self.probe.as_ref(), &self.policy)
    }
}

/// Poll `probe` until it reports ready or the policy's attempts run out.
///
/// Sleeps `policy.interval` between attempts, never after the last one.
/// Returns the number of attempts used.
///
/// # Errors
///
/// Returns `ReadinessError::Exhausted` after `max_attempts` failed checks,
/// or `ReadinessError::Probe` if the probe cannot run at all.
pub fn wait_until_ready(service: &str, probe: &dyn Probe, policy: &ReadinessPolicy) -> Result<u32> {
    for attempt in 1..=policy.max_attempts {
        let ready = probe.check().map_err(|source| ReadinessError::Probe {
            service: service.to_string(),
            source,
        })?;

        if ready {
            info!(service, attempt, "service ready");
            return Ok(attempt);
        }

        debug!(service, attempt, max = policy.max_attempts, "service not ready");
        if attempt < policy.max_attempts {
            thread::sleep(policy.interval);
        }
    }

    Err(ReadinessError::Exhausted {
        service: service.to_string(),
        attempts: policy.max_attempts,
    }
    .into())
}
