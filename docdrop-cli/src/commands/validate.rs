//! `docdrop validate` — load and check the config file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::run::load_valid_config;

/// Arguments for `docdrop validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Config file to check.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let config = load_valid_config(self.config.as_deref())?;
        let paths: usize = config.tasks.iter().map(|t| t.paths.len()).sum();
        println!(
            "{} config is valid ({} task(s), {} path mapping(s))",
            "✓".green(),
            config.tasks.len(),
            paths
        );
        for (index, task) in config.tasks.iter().enumerate() {
            println!("  {} (on_error: {})", task.label(index), task.on_error);
            for mapping in &task.paths {
                println!("    {} → {}", mapping.local.display(), mapping.remote);
            }
        }
        Ok(())
    }
}
