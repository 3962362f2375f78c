//! Secret resolution.
//!
//! Secrets are read from the process environment (where CI runners inject
//! them), held in zeroizing buffers, and handed only to the stages that
//! declare them.

use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants;
use crate::core::env::EnvSet;
use crate::core::types::SecretName;
use crate::error::{Error, Result, StageError};

/// A named credential value.
///
/// The value is wiped from memory on drop and never shown by `Debug`.
pub struct Secret {
    name: SecretName,
    value: Zeroizing<String>,
}

impl Secret {
    pub fn new(name: impl Into<SecretName>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Zeroizing::new(value.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expose the plaintext, for injection into a child process.
    pub fn expose(&self) -> &str {
        self.value.as_str()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("value", &constants::MASK)
            .finish()
    }
}

/// Secret values available to a run, keyed by name.
#[derive(Default)]
pub struct SecretStore {
    values: BTreeMap<SecretName, Zeroizing<String>>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `names` through `lookup`. Empty values count as absent, which is
    /// how CI runners expose undefined secrets.
    pub fn from_lookup<'a, F>(names: impl IntoIterator<Item = &'a SecretName>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut store = Self::new();
        for name in names {
            match lookup(name) {
                Some(value) if !value.is_empty() => store.insert(name.as_str(), value),
                _ => debug!(secret = %name, "secret not provided"),
            }
        }
        store
    }

    /// Read `names` from the assembled environment set, falling back to
    /// the process environment. Locally the dotenv file stands in for the
    /// CI runner's secret store.
    pub fn from_env<'a>(names: impl IntoIterator<Item = &'a SecretName>, env: &EnvSet) -> Self {
        Self::from_env_with(names, env, |name| std::env::var(name).ok())
    }

    /// [`SecretStore::from_env`] with an injectable fallback lookup.
    pub fn from_env_with<'a, F>(
        names: impl IntoIterator<Item = &'a SecretName>,
        env: &EnvSet,
        fallback: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(names, |name| {
            env.get(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .or_else(|| fallback(name))
        })
    }

    pub fn insert(&mut self, name: impl Into<SecretName>, value: impl Into<String>) {
        self.values.insert(name.into(), Zeroizing::new(value.into()));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names from `declared` that this store cannot provide.
    pub fn missing<'a>(&self, declared: &'a [SecretName]) -> Vec<&'a str> {
        declared
            .iter()
            .filter(|n| !self.contains(n))
            .map(String::as_str)
            .collect()
    }

    /// Resolve exactly the secrets a stage declares.
    ///
    /// # Errors
    ///
    /// Returns `StageError::MissingSecret` for the first declared name with no
    /// value.
    pub fn resolve(&self, declared: &[SecretName]) -> Result<Vec<Secret>> {
        declared
            .iter()
            .map(|name| {
                self.values
                    .get(name)
                    .map(|v| Secret::new(name.as_str(), v.as_str()))
                    .ok_or_else(|| Error::from(StageError::MissingSecret(name.clone())))
            })
            .collect()
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
