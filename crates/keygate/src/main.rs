//! Keygate CLI
//!
//! Resolves authorization levels against a secrets directory and maintains
//! the documents in it.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

/// Overrides the verbosity flags when set
const LOG_ENV: &str = "KEYGATE_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let global = cli.global_options();
    match cli.command {
        Commands::Version(args) => commands::version::run(args),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Resolve(args) => commands::resolve::run(args, &global).await,
        Commands::Secrets(cmd) => commands::secrets::run(cmd, &global).await,
    }
}

fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

/// Logs go to stderr; stdout carries command output
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
