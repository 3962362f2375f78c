//! Tests for `deckhand init`.

use crate::support::*;

#[test]
fn test_init_writes_default_pipeline() {
    let t = Test::new();

    let output = t.init_cmd();
    assert_success(&output);
    assert_stdout_contains(&output, "wrote .deckhand.toml");

    let config: toml::Value = toml::from_str(&t.read(".deckhand.toml")).unwrap();
    let names: Vec<&str> = config["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, STAGES);
    assert_eq!(config["pipeline"]["designated_branch"].as_str(), Some("main"));
    assert_eq!(config["stages"][4]["gated"].as_bool(), Some(true));
}

#[test]
fn test_init_protects_env_files() {
    let t = Test::new();
    t.write(".gitignore", "target/\n");

    assert_success(&t.init_cmd());

    let gitignore = t.read(".gitignore");
    assert!(gitignore.starts_with("target/\n"));
    assert!(gitignore.lines().any(|l| l == ".env"));
    assert!(gitignore.lines().any(|l| l == "!.env.example"));
}

#[test]
fn test_init_twice_fails() {
    let t = Test::init();

    let output = t.init_cmd();
    assert_failure(&output);
    assert_stderr_contains(&output, "already initialized");
    assert_stderr_contains(&output, "--force");
}

#[test]
fn test_init_force_overwrites() {
    let t = Test::with_config("garbage = true\n");

    let output = t.cmd().args(["init", "--force"]).output().unwrap();
    assert_success(&output);
    assert!(t.read(".deckhand.toml").contains("[[stages]]"));
}

#[test]
fn test_init_custom_path() {
    let t = Test::new();
    std::fs::create_dir(t.dir.path().join("ci")).unwrap();

    let output = t
        .cmd()
        .args(["--config", "ci/pipeline.toml", "init"])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(t.dir.path().join("ci/pipeline.toml").exists());
    assert!(t.dir.path().join("ci/.gitignore").exists());
}
