//! Shared CLI output helpers.
//!
//! Color scheme (respects NO_COLOR and non-terminal output):
//! - Green: success, passed stages
//! - Red: errors, failed stages
//! - Yellow: warnings, non-blocking failures
//! - Cyan: stage names, commands, hints
//! - Dimmed: skipped stages, secondary info

use console::{style, StyledObject};
use std::fmt::Display;

use crate::core::report::{RunReport, RunStatus, StageOutcome, StageStatus};

const RULE_WIDTH: usize = 56;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

fn paint<D>(value: D, f: impl FnOnce(StyledObject<D>) -> StyledObject<D>) -> String
where
    D: Display,
{
    if colors_enabled() {
        f(style(value)).to_string()
    } else {
        value.to_string()
    }
}

/// Print a success message with checkmark.
///
/// Example: `✓ wrote .deckhand.toml`
pub fn success(msg: &str) {
    println!("{} {}", paint("✓", |s| s.green()), msg);
}

/// Print an error message to stderr.
///
/// Example: `✗ not initialized: .deckhand.toml not found`
pub fn error(msg: &str) {
    eprintln!("{} {}", paint("✗", |s| s.red()), msg);
}

/// Print a warning message.
pub fn warn(msg: &str) {
    println!("{} {}", paint("⚠", |s| s.yellow()), msg);
}

/// Print a hint message to stderr.
///
/// Example: `→ run: deckhand init`
pub fn hint(msg: &str) {
    eprintln!("{} {}", paint("→", |s| s.cyan()), paint(msg, |s| s.cyan()));
}

/// Print a key-value pair (label dimmed, value bold).
pub fn kv(label: &str, value: impl Display) {
    println!(
        "  {}  {}",
        paint(format!("{:<10}", label), |s| s.dim()),
        paint(value.to_string(), |s| s.bold())
    );
}

/// Print a list item with bullet.
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    println!("{}", paint(msg, |s| s.dim()));
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    println!();
    println!("{}", paint(title, |s| s.bold()));
    println!("{}", paint("─".repeat(RULE_WIDTH), |s| s.dim()));
}

/// Format a stage or variable name in cyan.
pub fn key(k: &str) -> String {
    paint(k, |s| s.cyan())
}

/// Format a command string in green.
pub fn cmd(c: &str) -> String {
    paint(c, |s| s.green())
}

/// Announce a stage before its tools start printing.
pub fn stage_started(name: &str) {
    println!("{} {}", paint("▸", |s| s.cyan().bold()), key(name));
}

fn format_ms(ms: u64) -> String {
    if ms < 1_000 {
        format!("{}ms", ms)
    } else {
        format!("{:.1}s", ms as f64 / 1_000.0)
    }
}

/// One line per finished stage.
pub fn stage_finished(outcome: &StageOutcome) {
    let name = &outcome.name;
    let took = format_ms(outcome.duration_ms);

    match &outcome.status {
        StageStatus::Passed => {
            println!("{} {} {}", paint("✓", |s| s.green()), name, paint(took, |s| s.dim()))
        }
        StageStatus::Failed { reason } => eprintln!(
            "{} {} {}: {}",
            paint("✗", |s| s.red()),
            name,
            paint(took, |s| s.dim()),
            reason
        ),
        StageStatus::FailedAllowed { reason } => println!(
            "{} {} failed (allowed): {}",
            paint("⚠", |s| s.yellow()),
            name,
            reason
        ),
        StageStatus::Skipped { reason } => {
            println!("{}", paint(format!("- {} skipped: {}", name, reason), |s| s.dim()))
        }
        StageStatus::NotRun => dimmed(&format!("- {} not run", name)),
    }
}

/// Closing summary for a run.
pub fn summary(report: &RunReport) {
    let took = format_ms(report.total_duration_ms());
    match &report.status {
        RunStatus::Succeeded => success(&format!(
            "pipeline succeeded on {} in {}",
            report.branch, took
        )),
        RunStatus::Failed { stage } => dimmed(&failed_summary(report, stage, &took)),
        RunStatus::NotTriggered => dimmed(&format!(
            "branch '{}' does not trigger a run; nothing to do",
            report.branch
        )),
    }
}

fn failed_summary(report: &RunReport, stage: &str, took: &str) -> String {
    let not_run = report
        .stages
        .iter()
        .filter(|s| s.status == StageStatus::NotRun)
        .count();
    format!(
        "failed at stage '{}' on {} after {}; {} stage(s) not run",
        stage, report.branch, took, not_run
    )
}
