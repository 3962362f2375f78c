//! Constants used throughout deckhand.
//!
//! Centralizes file names, defaults and environment variable names.

/// Configuration file name (.deckhand.toml).
pub const CONFIG_FILE: &str = ".deckhand.toml";

/// Local environment file name (.env).
pub const ENV_FILE: &str = ".env";

/// Branch whose pushes unlock gated stages when the config names none.
pub const DEFAULT_DESIGNATED_BRANCH: &str = "main";

/// Branches that trigger a run when the config names none.
pub const DEFAULT_TRIGGER_BRANCHES: &[&str] = &["main", "develop"];

/// Variables every environment context must provide by default.
pub const DEFAULT_REQUIRED_ENV: &[&str] =
    &["DB_NAME", "DB_USER", "DB_PASSWORD", "DB_HOST", "DB_PORT"];

/// Delay between readiness probe attempts, in milliseconds.
pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 2_000;

/// Probe attempts before a service is declared unavailable.
pub const DEFAULT_PROBE_ATTEMPTS: u32 = 30;

/// CI variables consulted, in order, for the triggering branch.
pub const BRANCH_ENV_VARS: &[&str] = &["GITHUB_REF_NAME", "CI_COMMIT_BRANCH"];

/// Gitignore entries to keep local env files out of version control.
pub const GITIGNORE_ENTRIES: &[&str] = &[".env", ".env.*", "!.env.example"];

/// Placeholder printed instead of a secret or env value.
pub const MASK: &str = "********";
