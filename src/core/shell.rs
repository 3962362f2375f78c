//! Shell invocation.

use std::process::Command;

/// Build a command that runs `line` through the platform shell.
#[cfg(unix)]
pub fn command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

/// Build a command that runs `line` through the platform shell.
#[cfg(windows)]
pub fn command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

/// First word of a command line, which is the program it starts.
///
/// Leading `VAR=value` assignments are skipped.
pub fn program(line: &str) -> Option<&str> {
    line.split_whitespace().find(|word| !is_assignment(word))
}

fn is_assignment(word: &str) -> bool {
    match word.split_once('=') {
        Some((name, _)) => crate::core::env::validate_name(name).is_ok(),
        None => false,
    }
}
