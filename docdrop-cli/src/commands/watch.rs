//! `docdrop watch` — repeated delivery passes until Ctrl-C.
//!
//! Passes never overlap: the next sleep only starts once the previous pass
//! has returned. The config is re-read before every pass; if it has become
//! unreadable or invalid the last good one is kept.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::sync::oneshot;

use docdrop_core::Config;
use docdrop_delivery::{run_all, RunOptions};
use docdrop_remote::HttpConnector;

use super::run::{load_valid_config, print_summary};

/// Arguments for `docdrop watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Config file to load.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds to wait between the end of one pass and the start of the next.
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Resolve and report only; never connect, upload or delete.
    #[arg(long)]
    pub dry_run: bool,
}

impl WatchArgs {
    pub fn run(self) -> Result<()> {
        let config = load_valid_config(self.config.as_deref())?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;

        runtime.block_on(async move {
            let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => tracing::info!("received ctrl-c, stopping after the current pass"),
                    Err(err) => tracing::error!(error = %err, "ctrl-c handler failed"),
                }
                let _ = shutdown_tx.send(());
            });

            let options = RunOptions {
                dry_run: self.dry_run,
            };
            tracing::info!(interval_secs = self.interval, "watching for trigger files");
            let passes = watch_loop(
                self.config.as_deref(),
                config,
                Duration::from_secs(self.interval),
                options,
                shutdown_rx,
            )
            .await?;
            tracing::info!(passes, "watch stopped");
            Ok(())
        })
    }
}

/// Run passes until `shutdown` fires; returns the number of passes run.
async fn watch_loop(
    explicit: Option<&Path>,
    initial: Config,
    interval: Duration,
    options: RunOptions,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<usize> {
    let mut config = Arc::new(initial);
    let mut passes = 0;

    loop {
        let pass_config = Arc::clone(&config);
        let summary = tokio::task::spawn_blocking(move || {
            run_all(&pass_config, &HttpConnector::new(), options)
        })
        .await
        .context("delivery pass panicked")?;
        passes += 1;

        print_summary(&summary, options.dry_run);
        if !summary.is_success() {
            tracing::warn!(pass = passes, "delivery pass finished with errors");
        }

        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(interval) => {}
        }

        config = reload_or_keep(explicit, config);
    }

    Ok(passes)
}

/// Config for the next pass: a fresh load, or `current` if that fails.
fn reload_or_keep(explicit: Option<&Path>, current: Arc<Config>) -> Arc<Config> {
    match load_valid_config(explicit) {
        Ok(fresh) => Arc::new(fresh),
        Err(err) => {
            tracing::warn!(
                error = %format!("{err:#}"),
                "config reload failed, keeping previous config",
            );
            current
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
