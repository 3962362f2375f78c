//! Tests for `deckhand check`.

use crate::support::*;

#[test]
fn test_check_passes_for_fixture_pipeline() {
    let t = Test::pipeline(None);

    let output = t.check("local");
    assert_success(&output);
    assert_stdout_contains(&output, ".deckhand.toml is valid");
    assert_stdout_contains(&output, "all checks passed");
}

#[test]
fn test_check_reports_missing_program() {
    let t = Test::with_config(
        r#"
[env]
required = []

[[stages]]
name = "lint"
run = "deckhand-no-such-linter --strict"
"#,
    );

    let output = t.check("local");
    assert_failure(&output);
    assert_stdout_contains(&output, "'deckhand-no-such-linter' not found on PATH");
    assert_stderr_contains(&output, "check found 1 problem(s)");
}

#[test]
fn test_check_reports_missing_secret() {
    let t = Test::with_config(
        r#"
[env]
required = []

[[stages]]
name = "deploy"
run = "echo deploy"
secrets = ["DEPLOY_TOKEN"]
gated = true
"#,
    );

    for context in ["local", "ci"] {
        let output = t.check(context);
        assert_failure(&output);
        assert_stdout_contains(&output, "DEPLOY_TOKEN not provided (needed by deploy)");
        assert_stderr_contains(&output, "check found 1 problem(s)");
    }

    let output = t
        .cmd()
        .args(["check", "--context", "ci"])
        .env("DEPLOY_TOKEN", "tok")
        .output()
        .unwrap();
    assert_success(&output);
    assert_output_excludes(&output, "tok\n");
}

#[test]
fn test_check_local_secret_from_env_file() {
    let t = Test::with_config(
        r#"
[env]
required = ["DB_PASSWORD"]

[[stages]]
name = "test"
run = "echo test"
secrets = ["DB_PASSWORD"]
"#,
    );
    t.write(".env", "DB_PASSWORD=local-password\n");

    let output = t.check("local");
    assert_success(&output);
    assert_stdout_contains(&output, "DB_PASSWORD provided");
    assert_stdout_contains(&output, "all checks passed");
    assert_output_excludes(&output, "local-password");
}

#[test]
fn test_check_rejects_invalid_config() {
    let t = Test::with_config(
        r#"
[[stages]]
name = "test"
run = "true"

[[stages]]
name = "test"
run = "true"
"#,
    );

    let output = t.check("local");
    assert_failure(&output);
    assert_stderr_contains(&output, "duplicate stage name: test");
}

#[test]
fn test_check_unknown_service() {
    let t = Test::with_config(
        r#"
[[stages]]
name = "test"
run = "true"
needs = ["database"]
"#,
    );

    let output = t.check("local");
    assert_failure(&output);
    assert_stderr_contains(&output, "needs unknown service 'database'");
}
