//! Environment variable sets.
//!
//! Stages run with a set of variables assembled per execution context: a local
//! dotenv file, variables injected by the CI platform, or `${NAME}` templates
//! interpolated the way managed hosting platforms do.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::core::config::EnvConfig;
use crate::error::{EnvError, Result};

/// Where an environment set comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    /// Non-versioned dotenv file next to the config
    Local,
    /// Process environment populated by the CI runner
    Ci,
    /// `[env.platform]` templates resolved against the process environment
    Platform,
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Ci => write!(f, "ci"),
            Self::Platform => write!(f, "platform"),
        }
    }
}

impl Context {
    /// `ci` when the `CI` variable is set to anything but `false` or empty,
    /// `local` otherwise.
    pub fn detect<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("CI").as_deref().map(str::trim) {
            None | Some("") | Some("false") | Some("0") => Self::Local,
            Some(_) => Self::Ci,
        }
    }
}

/// Validate an environment variable name.
///
/// Names must be non-empty, use only A-Z, a-z, 0-9 and underscore, and must
/// not start with a digit.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(EnvError::InvalidName(name.to_string()).into())
    }
}

/// An ordered name to value mapping handed to stage processes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSet {
    vars: BTreeMap<String, String>,
}

impl EnvSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay `other` on top of this set.
    pub fn extend(&mut self, other: &EnvSet) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }

    /// Parse dotenv content.
    ///
    /// Skips blank lines and `#` comments, accepts an optional `export `
    /// prefix, and strips one layer of matching quotes around values.
    pub fn parse_dotenv(contents: &str, path: &Path) -> Result<Self> {
        let mut set = Self::new();

        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return Err(EnvError::InvalidLine {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    content: raw.to_string(),
                }
                .into());
            };

            let key = key.trim();
            validate_name(key)?;
            set.insert(key, unquote(value.trim()));
        }

        Ok(set)
    }

    /// Read a dotenv file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EnvError::FileNotFound(path.to_path_buf()).into());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse_dotenv(&contents, path)
    }

    /// Capture `names` from `lookup`, skipping names it does not know.
    pub fn capture<'a, F>(names: impl IntoIterator<Item = &'a String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut set = Self::new();
        for name in names {
            if let Some(value) = lookup(name) {
                set.insert(name.as_str(), value);
            }
        }
        set
    }

    /// Resolve `${NAME}` references in each template against `lookup`.
    pub fn interpolate<F>(templates: &BTreeMap<String, String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut set = Self::new();
        for (key, template) in templates {
            set.insert(key.as_str(), interpolate_one(key, template, &lookup)?);
        }
        Ok(set)
    }

    /// Fail listing every name in `names` this set does not define.
    pub fn require(&self, names: &[String]) -> Result<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !self.contains(n))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EnvError::MissingRequired(missing).into())
        }
    }

    /// Assemble the set for `context`.
    ///
    /// `base` is the directory relative paths in `config` resolve against;
    /// `lookup` reads the process environment.
    pub fn assemble<F>(config: &EnvConfig, context: Context, base: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = match context {
            Context::Local => {
                let path = base.join(&config.file);
                // Nothing is required, so an absent file just means an empty set.
                if config.required.is_empty() && !path.exists() {
                    Self::new()
                } else {
                    Self::from_file(&path)?
                }
            }
            Context::Ci => {
                Self::capture(config.required.iter().chain(config.platform.keys()), lookup)
            }
            Context::Platform => Self::interpolate(&config.platform, lookup)?,
        };

        debug!(context = %context, vars = set.len(), "environment assembled");
        set.require(&config.required)?;

        Ok(set)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn interpolate_one<F>(key: &str, template: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| EnvError::Unterminated {
            key: key.to_string(),
        })?;

        let name = after[..end].trim();
        let value = lookup(name).ok_or_else(|| EnvError::Unresolved {
            key: key.to_string(),
            name: name.to_string(),
        })?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
