//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables from the outer environment that would change behavior.
const SCRUBBED: &[&str] = &[
    "CI",
    "GITHUB_REF_NAME",
    "CI_COMMIT_BRANCH",
    "DECKHAND_BRANCH",
    "DECKHAND_CONFIG",
    "DECKHAND_LOG",
    "DECKHAND_LOG_FORMAT",
    "DB_NAME",
    "DB_USER",
    "DB_PASSWORD",
    "DB_HOST",
    "DB_PORT",
    "REGISTRY_USERNAME",
    "REGISTRY_TOKEN",
    "DEPLOY_TOKEN",
    "DEPLOY_PROJECT_ID",
];

impl Test {
    /// Create a deckhand command running in the project directory.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("deckhand").expect("failed to find deckhand binary");
        for name in SCRUBBED {
            cmd.env_remove(name);
        }
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `deckhand init`.
    pub fn init_cmd(&self) -> Output {
        self.cmd()
            .arg("init")
            .output()
            .expect("failed to run deckhand init")
    }

    /// Shortcut for `deckhand run --branch <branch>`.
    pub fn run(&self, branch: &str) -> Output {
        self.cmd()
            .args(["run", "--branch", branch])
            .output()
            .expect("failed to run deckhand run")
    }

    /// Shortcut for `deckhand run --branch <branch> --json`.
    pub fn run_json(&self, branch: &str) -> Output {
        self.cmd()
            .args(["run", "--branch", branch, "--json"])
            .output()
            .expect("failed to run deckhand run --json")
    }

    /// Shortcut for `deckhand plan --branch <branch>`.
    pub fn plan(&self, branch: &str) -> Output {
        self.cmd()
            .args(["plan", "--branch", branch])
            .output()
            .expect("failed to run deckhand plan")
    }

    /// Shortcut for `deckhand plan --branch <branch> --json`.
    pub fn plan_json(&self, branch: &str) -> Output {
        self.cmd()
            .args(["plan", "--branch", branch, "--json"])
            .output()
            .expect("failed to run deckhand plan --json")
    }

    /// Shortcut for `deckhand check --context <context>`.
    pub fn check(&self, context: &str) -> Output {
        self.cmd()
            .args(["check", "--context", context])
            .output()
            .expect("failed to run deckhand check")
    }

    /// Shortcut for `deckhand env --context <context>`.
    pub fn env(&self, context: &str) -> Output {
        self.cmd()
            .args(["env", "--context", context])
            .output()
            .expect("failed to run deckhand env")
    }
}
