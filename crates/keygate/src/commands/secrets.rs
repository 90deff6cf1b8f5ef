//! Secrets document commands

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use keygate_secrets::{DocumentInfo, DocumentSummary, FileSecretStore, SecretFormat};
use serde_json::json;
use std::path::Path;

use super::{load_config, open_store};
use crate::cli::GlobalOptions;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum SecretsCommands {
    /// List secrets documents, their format version and key names
    List(ListArgs),

    /// Parse every secrets document and report failures
    Validate,

    /// Rewrite documents in the current format version
    Upgrade(UpgradeArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Show what would be rewritten without writing
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(cmd: SecretsCommands, global: &GlobalOptions) -> Result<()> {
    let config = load_config(global)?;
    let store = open_store(&config).await;

    match cmd {
        SecretsCommands::List(args) => list(&store, args).await,
        SecretsCommands::Validate => validate(&store).await,
        SecretsCommands::Upgrade(args) => upgrade(&store, args).await,
    }
}

async fn list(store: &FileSecretStore, args: ListArgs) -> Result<()> {
    let documents = store
        .inspect()
        .await
        .context("Failed to read secrets directory")?;

    if args.json {
        let entries: Vec<_> = documents.iter().map(document_json).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if documents.is_empty() {
        output::info(&format!(
            "No secrets documents in {}",
            store.root().display()
        ));
        return Ok(());
    }

    output::header(&format!("Secrets documents ({} total)", documents.len()));

    for document in &documents {
        println!();
        match &document.summary {
            Ok(summary) => {
                println!(
                    "{} {} {}",
                    console::style(file_name(&document.path)).cyan(),
                    console::style(document.kind.label()).bold(),
                    style_format(summary.format)
                );
                print_keys(summary);
            }
            Err(e) => {
                println!(
                    "{} {} {}",
                    console::style(file_name(&document.path)).cyan(),
                    console::style(document.kind.label()).bold(),
                    console::style("invalid").red()
                );
                println!("    {}", console::style(e).dim());
            }
        }
    }

    Ok(())
}

async fn validate(store: &FileSecretStore) -> Result<()> {
    let documents = store
        .inspect()
        .await
        .context("Failed to read secrets directory")?;

    if documents.is_empty() {
        output::info(&format!(
            "No secrets documents in {}",
            store.root().display()
        ));
        return Ok(());
    }

    output::header(&format!("Validating {} documents", documents.len()));

    let mut failed = 0;
    for document in &documents {
        match &document.summary {
            Ok(summary) => output::success(&format!(
                "{} ({}, {} keys)",
                file_name(&document.path),
                summary.format,
                summary.keys.len()
            )),
            Err(e) => {
                failed += 1;
                output::error(&format!("{}: {}", file_name(&document.path), e));
            }
        }
    }

    if failed > 0 {
        bail!(
            "{} of {} secrets documents failed validation",
            failed,
            documents.len()
        );
    }

    output::success("All secrets documents are valid");
    Ok(())
}

async fn upgrade(store: &FileSecretStore, args: UpgradeArgs) -> Result<()> {
    let report = store
        .upgrade_documents(args.dry_run)
        .await
        .context("Failed to upgrade secrets documents")?;

    if report.is_noop() {
        output::success(&format!(
            "All {} documents already use format {}",
            report.current.len(),
            SecretFormat::CURRENT
        ));
        return Ok(());
    }

    for (path, from) in &report.upgraded {
        let line = format!("{}: {} -> {}", file_name(path), from, SecretFormat::CURRENT);
        if report.dry_run {
            output::warning(&format!("would upgrade {}", line));
        } else {
            output::success(&format!("upgraded {}", line));
        }
    }

    if report.dry_run {
        output::info("Dry run: no documents were written");
    }

    Ok(())
}

fn print_keys(summary: &DocumentSummary) {
    if summary.keys.is_empty() {
        println!("    {}", console::style("(no keys)").dim());
    }

    for key in &summary.keys {
        let name = if key.name.is_empty() {
            "(unnamed)"
        } else {
            key.name.as_str()
        };
        let encrypted = if key.is_encrypted { " [encrypted]" } else { "" };
        println!(
            "  {} {} {}{}",
            console::style("•").dim(),
            console::style(format!("{:<8}", key.scope)).dim(),
            name,
            console::style(encrypted).yellow()
        );
    }
}

fn document_json(document: &DocumentInfo) -> serde_json::Value {
    match &document.summary {
        Ok(summary) => json!({
            "path": document.path.display().to_string(),
            "kind": document.kind.label(),
            "format": summary.format.version(),
            "keys": summary
                .keys
                .iter()
                .map(|k| json!({
                    "scope": k.scope,
                    "name": k.name,
                    "encrypted": k.is_encrypted,
                }))
                .collect::<Vec<_>>(),
        }),
        Err(e) => json!({
            "path": document.path.display().to_string(),
            "kind": document.kind.label(),
            "error": e.to_string(),
        }),
    }
}

fn style_format(format: SecretFormat) -> console::StyledObject<String> {
    let text = format!("[{}]", format);
    if format.is_current() {
        console::style(text).green()
    } else {
        console::style(text).yellow()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
