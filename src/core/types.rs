//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A stage label (e.g., install, test, deploy).
pub type StageName = String;

/// A service name referenced by stages (e.g., database).
pub type ServiceName = String;

/// A secret name, which is also the env var it is injected as.
pub type SecretName = String;

/// A git branch name.
pub type BranchName = String;

/// A shell command line executed by a stage or probe.
pub type ShellCommand = String;
