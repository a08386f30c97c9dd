//! `docdrop run` — one delivery pass over every configured task.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use docdrop_core::{config, Config};
use docdrop_delivery::{run_all, DeliveryOutcome, RunOptions, RunSummary};
use docdrop_remote::HttpConnector;

/// Arguments for `docdrop run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Config file to load.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show what would be delivered without connecting, uploading or deleting.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let config = load_valid_config(self.config.as_deref())?;

        tracing::info!("========================================");
        tracing::info!("docdrop");
        tracing::info!("========================================");

        let options = RunOptions {
            dry_run: self.dry_run,
        };
        let summary = run_all(&config, &HttpConnector::new(), options);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to encode summary")?
            );
        } else {
            print_summary(&summary, self.dry_run);
        }

        if !summary.is_success() {
            let first = summary
                .first_error()
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("delivery run failed: {first}");
        }
        Ok(())
    }
}

/// Load the config and reject it if validation finds problems.
pub fn load_valid_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    let (path, config) = config::load(explicit).context("failed to load config")?;
    config
        .validate()
        .with_context(|| format!("invalid config at {}", path.display()))?;
    tracing::debug!(path = %path.display(), tasks = config.tasks.len(), "config loaded");
    Ok(config)
}

pub fn print_summary(summary: &RunSummary, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    for task in &summary.tasks {
        let Some(report) = &task.report else {
            let error = task.error.as_deref().unwrap_or("unknown error");
            println!("{prefix}{} '{}' — {error}", "✗".red(), task.task);
            continue;
        };

        let deliveries: Vec<_> = report.mappings.iter().flat_map(|m| &m.deliveries).collect();
        let mark = if report.failures.is_empty() {
            "✓".green()
        } else {
            "✗".red()
        };

        if deliveries.is_empty() && report.failures.is_empty() {
            println!("{prefix}{mark} '{}' — nothing to do", task.task);
            continue;
        }

        let verb = if dry_run { "would deliver" } else { "delivered" };
        println!(
            "{prefix}{mark} '{}' {verb} {} file(s) for {} trigger(s)",
            task.task,
            report.files_delivered(),
            deliveries.len()
        );

        for outcome in deliveries {
            match outcome {
                DeliveryOutcome::Delivered {
                    trigger,
                    files,
                    directory_removed,
                } => {
                    println!("  ⚑  {}", trigger.display());
                    for file in files {
                        println!("    ↑  {}", file.display());
                    }
                    if *directory_removed {
                        println!("    ✂  directory removed");
                    }
                }
                DeliveryOutcome::WouldDeliver { trigger, files } => {
                    println!("  ⚑  {}", trigger.display());
                    for file in files {
                        println!("    ~  {}", file.display());
                    }
                }
                DeliveryOutcome::Vanished { trigger } => {
                    println!("  ·  {} (already consumed)", trigger.display());
                }
            }
        }

        for failure in &report.failures {
            println!(
                "  {}  {} → {}: {}",
                "✗".red(),
                failure.local.display(),
                failure.remote,
                failure.error
            );
        }
    }
}
