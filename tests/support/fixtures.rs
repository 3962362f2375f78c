//! Test fixtures and pipeline builders.

use super::Test;

/// File every fixture stage appends its name to.
pub const STAGE_LOG: &str = "stages.log";

/// The five standard stages, in order.
pub const STAGES: &[&str] = &["install", "lint", "test", "build", "deploy"];

/// A `.env` defining every default required variable.
pub const LOCAL_ENV: &str = "\
DB_NAME=app
DB_USER=app
DB_PASSWORD=local-password
DB_HOST=localhost
DB_PORT=5432
";

/// Five-stage pipeline config. Each stage logs its name; `failing` exits 1
/// after logging. `deploy` is gated on `main`.
pub fn pipeline_config(failing: Option<&str>) -> String {
    let mut config = String::from(
        "[pipeline]\ndesignated_branch = \"main\"\nbranches = [\"main\", \"develop\"]\n",
    );

    for name in STAGES {
        let run = if failing == Some(*name) {
            format!("echo {} >> {} && exit 1", name, STAGE_LOG)
        } else {
            format!("echo {} >> {}", name, STAGE_LOG)
        };
        config.push_str(&format!("\n[[stages]]\nname = \"{}\"\nrun = \"{}\"\n", name, run));
        if *name == "deploy" {
            config.push_str("gated = true\n");
        }
    }

    config
}

impl Test {
    /// Project with the five-stage fixture pipeline and a complete `.env`.
    pub fn pipeline(failing: Option<&str>) -> Self {
        let t = Self::with_config(&pipeline_config(failing));
        t.write(".env", LOCAL_ENV);
        t
    }
}
