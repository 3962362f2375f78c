//! Tests for `deckhand plan`.

use crate::support::*;

#[test]
fn test_plan_develop_skips_deploy() {
    let t = Test::pipeline(None);

    let output = t.plan("develop");
    assert_success(&output);
    assert_stdout_contains(&output, "Plan for develop");
    assert_stdout_contains(&output, "deploy skipped: branch 'develop' is not 'main'");
    assert!(t.stage_log().is_empty(), "plan must not execute stages");
}

#[test]
fn test_plan_json() {
    let t = Test::pipeline(None);

    let doc = stdout_json(&t.plan_json("main"));
    assert_eq!(doc["branch"], "main");
    assert_eq!(doc["designated_branch"], "main");
    assert_eq!(doc["triggered"], true);
    let stages = doc["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 5);
    assert!(stages.iter().all(|s| s["will_run"] == true));
}

#[test]
fn test_plan_untriggered_branch() {
    let t = Test::pipeline(None);

    let doc = stdout_json(&t.plan_json("feature/login"));
    assert_eq!(doc["triggered"], false);
    assert!(doc["stages"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["will_run"] == false));

    let output = t.plan("feature/login");
    assert_success(&output);
    assert_stdout_contains(&output, "does not trigger a run");
}

#[test]
fn test_plan_branch_from_ci_variable() {
    let t = Test::pipeline(None);

    let output = t
        .cmd()
        .args(["plan", "--json"])
        .env("GITHUB_REF_NAME", "develop")
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout_json(&output)["branch"], "develop");
}
