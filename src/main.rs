//! mongorsh - interactive MongoDB shell
//!
//! Startup sequence: parse arguments, initialize logging, connect when a
//! URL was given, run the per-user rc script, then enter the interactive
//! loop.

use clap::Parser;
use tracing::Level;

use mongorsh::cli::CliArgs;
use mongorsh::config::{DisplayDefaults, LoggingConfig};
use mongorsh::error::Result;
use mongorsh::output::StdoutSink;
use mongorsh::repl::ShellEngine;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = CliArgs::parse();

    initialize_logging(&args);

    let mut out = StdoutSink::new();
    let mut engine = ShellEngine::new(DisplayDefaults::default());

    // A failed startup connection is fatal. Without a URL the shell
    // starts unconnected and the prompt stays bare.
    if let Some(url) = &args.url {
        engine.connect_startup(url, &mut out).await?;
    }

    if !args.norc {
        engine.load_rc(&mut out).await?;
    }

    engine.run().await
}

/// Logging goes to stderr so it never interleaves with rendered results.
fn initialize_logging(args: &CliArgs) {
    let config = LoggingConfig::default();
    let level = if args.very_verbose {
        Level::TRACE
    } else if args.verbose {
        Level::DEBUG
    } else {
        config.level.to_tracing_level()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
