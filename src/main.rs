//! Deckhand - Run build, test and deploy stages in order.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deckhand::cli::output;
use deckhand::cli::{execute, Cli};
use deckhand::error::{ConfigError, EnvError, Error, TriggerError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("DECKHAND_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("deckhand=debug")
        } else {
            EnvFilter::new("deckhand=warn")
        }
    });

    // DECKHAND_LOG_FORMAT=json emits machine-readable logs for CI log collectors
    let json = std::env::var("DECKHAND_LOG_FORMAT").is_ok_and(|f| f == "json");
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    if let Err(e) = execute(cli.command, &cli.config) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotInitialized(_)) => Some("run: deckhand init"),
            Error::Config(ConfigError::AlreadyInitialized(_)) => {
                Some("run: deckhand init --force")
            }
            Error::Env(EnvError::FileNotFound(_)) => {
                Some("create the file, or pass --context ci to read the process environment")
            }
            Error::Trigger(TriggerError::Undetermined | TriggerError::DetachedHead) => {
                Some("run: deckhand run --branch <name>")
            }
            Error::CheckFailed(_) => Some("fix the items marked ⚠ above"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
