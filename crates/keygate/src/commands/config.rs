//! Configuration commands

use anyhow::Result;
use clap::{Args, Subcommand};

use super::load_config;
use crate::cli::GlobalOptions;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOptions) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => show(args, global),
    }
}

fn show(args: ShowArgs, global: &GlobalOptions) -> Result<()> {
    let config = load_config(global)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    output::header("Configuration");
    output::kv("secrets path", config.secrets.path.as_str());
    output::kv(
        "refresh interval",
        &config
            .secrets
            .refresh_interval()
            .map(|d| format!("{}s", d.as_secs()))
            .unwrap_or_else(|| "on demand".to_string()),
    );
    output::kv(
        "key name filter",
        config.auth.key_name_filter.as_deref().unwrap_or("none"),
    );

    Ok(())
}
