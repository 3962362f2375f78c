//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "Usage");
    assert_stdout_contains(&output, "deckhand");
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "deckhand");
}

#[test]
fn test_run_without_config_hints_init() {
    let t = Test::new();

    t.cmd()
        .args(["run", "--branch", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"))
        .stderr(predicate::str::contains("run: deckhand init"));
}

#[test]
fn test_plan_without_config_hints_init() {
    let t = Test::new();

    t.cmd()
        .args(["plan", "--branch", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".deckhand.toml not found"));
}

#[test]
fn test_malformed_config() {
    let t = Test::with_config("[[stages]\nname = ");

    let output = t.plan("main");
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_config_flag_and_env() {
    let t = Test::new();
    std::fs::create_dir(t.dir.path().join("ci")).unwrap();
    std::fs::write(t.dir.path().join("ci/pipeline.toml"), pipeline_config(None)).unwrap();

    let output = t
        .cmd()
        .args(["--config", "ci/pipeline.toml", "plan", "--branch", "main"])
        .output()
        .unwrap();
    assert_success(&output);

    let output = t
        .cmd()
        .args(["plan", "--branch", "main"])
        .env("DECKHAND_CONFIG", "ci/pipeline.toml")
        .output()
        .unwrap();
    assert_success(&output);
}

#[test]
fn test_completions_bash() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "deckhand");
}

#[test]
fn test_completions_zsh() {
    let t = Test::new();

    let output = t.cmd().args(["completions", "zsh"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "#compdef deckhand");
}
