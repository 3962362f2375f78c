//! Configuration file management.
//!
//! Handles reading, writing, and validating `.deckhand.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::constants;
use crate::core::env;
use crate::core::types::{BranchName, SecretName, ServiceName, ShellCommand, StageName};
use crate::error::{ConfigError, Result};

/// Project configuration stored in `.deckhand.toml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Branch and trigger settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Environment set assembly per context
    #[serde(default)]
    pub env: EnvConfig,
    /// External services stages can wait on, keyed by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<ServiceName, ServiceConfig>,
    /// Ordered stage definitions
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Only pushes to this branch run gated stages.
    #[serde(default = "default_designated_branch")]
    pub designated_branch: BranchName,
    /// Pushes to these branches trigger a run.
    #[serde(default = "default_trigger_branches")]
    pub branches: Vec<BranchName>,
}

/// `[env]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvConfig {
    /// Dotenv file read in the `local` context
    #[serde(default = "default_env_file")]
    pub file: String,
    /// Names every context must resolve
    #[serde(default = "default_required_env")]
    pub required: Vec<String>,
    /// `${NAME}` templates resolved in the `platform` context
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub platform: BTreeMap<String, String>,
}

/// A service awaited through a readiness probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Shell command that exits 0 once the service is ready
    pub probe: ShellCommand,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// One `[[stages]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageConfig {
    pub name: StageName,
    /// Shell command line
    pub run: ShellCommand,
    /// Failure is recorded but does not stop the run
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_failure: bool,
    /// Runs only on the designated branch
    #[serde(default, skip_serializing_if = "is_false")]
    pub gated: bool,
    /// Services that must be ready before the command runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<ServiceName>,
    /// Secrets injected into this stage only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<SecretName>,
    /// Extra variables for this stage
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn default_designated_branch() -> BranchName {
    constants::DEFAULT_DESIGNATED_BRANCH.to_string()
}

fn default_trigger_branches() -> Vec<BranchName> {
    constants::DEFAULT_TRIGGER_BRANCHES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_env_file() -> String {
    constants::ENV_FILE.to_string()
}

fn default_required_env() -> Vec<String> {
    constants::DEFAULT_REQUIRED_ENV
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_interval_ms() -> u64 {
    constants::DEFAULT_PROBE_INTERVAL_MS
}

fn default_max_attempts() -> u32 {
    constants::DEFAULT_PROBE_ATTEMPTS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            designated_branch: default_designated_branch(),
            branches: default_trigger_branches(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            file: default_env_file(),
            required: default_required_env(),
            platform: BTreeMap::new(),
        }
    }
}

impl StageConfig {
    /// Create a blocking, ungated stage.
    pub fn new(name: impl Into<StageName>, run: impl Into<ShellCommand>) -> Self {
        Self {
            name: name.into(),
            run: run.into(),
            allow_failure: false,
            gated: false,
            needs: Vec::new(),
            secrets: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Create the default five-stage pipeline written by `deckhand init`.
    pub fn new() -> Self {
        let db_secrets = vec![
            "DB_NAME".to_string(),
            "DB_USER".to_string(),
            "DB_PASSWORD".to_string(),
        ];

        let mut services = BTreeMap::new();
        services.insert(
            "database".to_string(),
            ServiceConfig {
                probe: "pg_isready -h \"${DB_HOST:-localhost}\" -p \"${DB_PORT:-5432}\"".to_string(),
                interval_ms: default_interval_ms(),
                max_attempts: default_max_attempts(),
            },
        );

        let install = StageConfig::new("install", "pip install -r requirements.txt");
        let lint = StageConfig::new("lint", "flake8 . && bandit -r . -q");
        let test = StageConfig {
            needs: vec!["database".to_string()],
            secrets: db_secrets,
            ..StageConfig::new("test", "python manage.py migrate && pytest")
        };
        let build = StageConfig {
            secrets: vec!["REGISTRY_USERNAME".to_string(), "REGISTRY_TOKEN".to_string()],
            ..StageConfig::new(
                "build",
                "docker build -t \"$REGISTRY_USERNAME/app:latest\" . \
                 && echo \"$REGISTRY_TOKEN\" | docker login -u \"$REGISTRY_USERNAME\" --password-stdin \
                 && docker push \"$REGISTRY_USERNAME/app:latest\"",
            )
        };
        let deploy = StageConfig {
            gated: true,
            secrets: vec!["DEPLOY_TOKEN".to_string(), "DEPLOY_PROJECT_ID".to_string()],
            ..StageConfig::new(
                "deploy",
                "railway link \"$DEPLOY_PROJECT_ID\" && railway up --detach && railway logs",
            )
        };

        Self {
            pipeline: PipelineConfig::default(),
            env: EnvConfig::default(),
            services,
            stages: vec![install, lint, test, build, deploy],
        }
    }

    /// Load configuration from `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotInitialized` if the file doesn't exist,
    /// or `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotInitialized(path.to_path_buf()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        debug!(
            stages = config.stages.len(),
            services = config.services.len(),
            "config loaded"
        );

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Look up a stage by name.
    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Every secret declared by any stage.
    pub fn declared_secrets(&self) -> BTreeSet<SecretName> {
        self.stages
            .iter()
            .flat_map(|s| s.secrets.iter().cloned())
            .collect()
    }

    /// Validate the configuration structure and contents
    ///
    /// Checks:
    /// - At least one stage exists, names are non-empty and unique
    /// - Every stage has a command
    /// - Every service a stage needs is defined, with a usable probe policy
    /// - Secret and env names are valid environment variable names
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        if self.pipeline.designated_branch.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "pipeline.designated_branch",
            }
            .into());
        }
        if self.pipeline.branches.is_empty() {
            return Err(ConfigError::MissingField {
                field: "pipeline.branches",
            }
            .into());
        }
        if !self
            .pipeline
            .branches
            .contains(&self.pipeline.designated_branch)
        {
            warn!(
                branch = %self.pipeline.designated_branch,
                "designated branch is not a trigger branch; gated stages will never run"
            );
        }

        if self.stages.is_empty() {
            return Err(ConfigError::NoStages.into());
        }

        let mut seen = BTreeSet::new();
        for stage in &self.stages {
            if stage.name.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "stages.name",
                }
                .into());
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(ConfigError::DuplicateStage(stage.name.clone()).into());
            }
            if stage.run.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "stages.run",
                    reason: format!("stage '{}' has an empty command", stage.name),
                }
                .into());
            }
            for service in &stage.needs {
                if !self.services.contains_key(service) {
                    return Err(ConfigError::UnknownService {
                        stage: stage.name.clone(),
                        service: service.clone(),
                    }
                    .into());
                }
            }
            for name in stage.secrets.iter().chain(stage.env.keys()) {
                env::validate_name(name)?;
            }
        }

        for (name, service) in &self.services {
            if service.probe.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "services.probe",
                    reason: format!("service '{}' has an empty probe", name),
                }
                .into());
            }
            if service.max_attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "services.max_attempts",
                    reason: format!("service '{}' must allow at least one attempt", name),
                }
                .into());
            }
        }

        for name in self.env.required.iter().chain(self.env.platform.keys()) {
            env::validate_name(name)?;
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensure `.gitignore` in `dir` contains entries to ignore `.env` files
///
/// Adds `.env`, `.env.*`, and `!.env.example` if not already present.
///
/// # Errors
///
/// Returns error if file operations fail.
pub fn ensure_gitignore(dir: &Path) -> Result<()> {
    let gitignore = dir.join(".gitignore");

    let existing = if gitignore.exists() {
        std::fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };

    let mut updated = existing.clone();
    for entry in constants::GITIGNORE_ENTRIES {
        if !existing.lines().any(|l| l.trim() == *entry) {
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(entry);
            updated.push('\n');
        }
    }

    if updated != existing {
        std::fs::write(gitignore, updated)?;
    }

    Ok(())
}
