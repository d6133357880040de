//! Command-line interface for mongorsh
//!
//! One optional positional argument (the connection URL) plus verbosity
//! and rc-suppression switches. When no URL is given the shell starts
//! without a connection.

use clap::Parser;

/// Interactive MongoDB shell
#[derive(Parser, Debug)]
#[command(
    name = "mongorsh",
    version,
    about = "Interactive MongoDB shell written in Rust"
)]
pub struct CliArgs {
    /// MongoDB connection URI
    ///
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    #[arg(value_name = "URI")]
    pub url: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Enable trace logging
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Skip the per-user rc script
    #[arg(long)]
    pub norc: bool,
}
