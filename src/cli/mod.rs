//! Command-line interface.

pub mod check;
pub mod env;
pub mod init;
pub mod output;
pub mod plan;
pub mod run;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::core::constants;
use crate::core::env::Context;

/// Deckhand - Run build, test and deploy stages in order.
#[derive(Parser)]
#[command(
    name = "deckhand",
    about = "Run build, test and deploy stages in order, deploying only from the designated branch",
    version,
    after_help = "Stages run top to bottom. The first failure stops the run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pipeline configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "DECKHAND_CONFIG",
        default_value = constants::CONFIG_FILE
    )]
    pub config: PathBuf,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Write a default five-stage pipeline configuration
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Run the pipeline
    Run {
        /// Triggering branch (detected from CI variables or git when omitted)
        #[arg(short, long, env = "DECKHAND_BRANCH")]
        branch: Option<String>,
        /// Where the environment set comes from (default: ci when CI is set, else local)
        #[arg(long, value_enum)]
        context: Option<Context>,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which stages a run would execute or skip
    Plan {
        /// Triggering branch (detected from CI variables or git when omitted)
        #[arg(short, long, env = "DECKHAND_BRANCH")]
        branch: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration, stage programs, secrets and environment
    Check {
        /// Environment context to verify (default: ci when CI is set, else local)
        #[arg(long, value_enum)]
        context: Option<Context>,
    },

    /// Show the resolved environment set with values masked
    Env {
        /// Where the environment set comes from (default: ci when CI is set, else local)
        #[arg(long, value_enum)]
        context: Option<Context>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Execute a command against the configuration at `config`.
pub fn execute(command: Command, config: &Path) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Init { force } => init::execute(config, force),
        Run {
            branch,
            context,
            json,
        } => run::execute(config, branch.as_deref(), context, json),
        Plan { branch, json } => plan::execute(config, branch.as_deref(), json),
        Check { context } => check::execute(config, context),
        Env { context, json } => env::execute(config, context, json),
        Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "deckhand", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Directory relative paths in the configuration resolve against.
pub(crate) fn base_dir(config: &Path) -> &Path {
    match config.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// The context to use when none was given on the command line.
pub(crate) fn context_or_detect(context: Option<Context>) -> Context {
    context.unwrap_or_else(|| Context::detect(|name| std::env::var(name).ok()))
}
