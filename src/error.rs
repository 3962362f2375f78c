//! Error types.
//!
//! Errors are grouped by concern and folded into a single [`Error`] at the
//! crate boundary so the CLI can pick a hint per variant.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by every fallible operation in deckhand.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error("pipeline failed at stage '{0}'")]
    RunFailed(String),

    #[error("check found {0} problem(s)")]
    CheckFailed(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Problems with the project configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("not initialized: {} not found", .0.display())]
    NotInitialized(PathBuf),

    #[error("already initialized: {} exists (use --force to overwrite)", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("duplicate stage name: {0}")]
    DuplicateStage(String),

    #[error("stage '{stage}' needs unknown service '{service}'")]
    UnknownService { stage: String, service: String },

    #[error("no stages defined")]
    NoStages,
}

/// Failures raised while running a single stage.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("'{command}' exited with status {code}")]
    Exited { command: String, code: i32 },

    #[error("'{command}' was terminated by a signal")]
    Terminated { command: String },

    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("secret not provided: {0}")]
    MissingSecret(String),

    #[error("empty command")]
    EmptyCommand,
}

/// Service readiness failures.
#[derive(Error, Debug)]
pub enum ReadinessError {
    #[error("service '{service}' not ready after {attempts} attempts")]
    Exhausted { service: String, attempts: u32 },

    #[error("probe for '{service}' could not run: {source}")]
    Probe {
        service: String,
        #[source]
        source: std::io::Error,
    },
}

/// Environment set assembly failures.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("env file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("invalid line {line} in {}: {content}", .path.display())]
    InvalidLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("missing required variables: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("unresolved reference ${{{name}}} in {key}")]
    Unresolved { key: String, name: String },

    #[error("unterminated reference in {key}")]
    Unterminated { key: String },

    #[error("invalid variable name: {0}")]
    InvalidName(String),
}

/// Branch resolution failures.
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("could not determine the current branch (pass --branch)")]
    Undetermined,

    #[error("detached HEAD: pass --branch to name the triggering branch")]
    DetachedHead,
}

pub type Result<T> = std::result::Result<T, Error>;
