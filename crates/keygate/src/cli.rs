//! CLI argument parsing with clap

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};

// Re-export command types for convenience
pub use crate::commands::config::ConfigCommands;
pub use crate::commands::secrets::SecretsCommands;

/// Keygate - authorization keys for function hosts
#[derive(Parser, Debug)]
#[command(name = "keygate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Secrets directory (overrides config and environment)
    #[arg(long, global = true)]
    pub secrets_path: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Options shared by every command
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
            secrets_path: self.secrets_path.clone(),
        }
    }
}

/// Global flags that feed configuration loading
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<Utf8PathBuf>,
    pub secrets_path: Option<Utf8PathBuf>,
}

impl GlobalOptions {
    pub fn config_path(&self) -> Option<&Utf8Path> {
        self.config.as_deref()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Resolve the authorization level of a key
    Resolve(ResolveArgs),

    /// Secrets document management
    #[command(subcommand)]
    Secrets(SecretsCommands),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Candidate key, compared directly
    #[arg(long, conflicts_with_all = ["header", "query"])]
    pub key: Option<String>,

    /// Value of the x-functions-key header
    #[arg(long)]
    pub header: Option<String>,

    /// Raw query string, e.g. "code=abc"
    #[arg(long)]
    pub query: Option<String>,

    /// Function the request targets
    #[arg(short, long)]
    pub function: Option<String>,

    /// Only accept system and function keys with this name
    #[arg(long)]
    pub key_name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
