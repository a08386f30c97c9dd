//! Task runner: one session per task, path mappings in order.
//!
//! ```text
//! connect ─▶ for each mapping: scan ─▶ (Skip) next mapping
//!                                    └▶ get_folder ─▶ deliver each trigger
//!         ─▶ close (always, exactly once)
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use docdrop_core::{Config, FailurePolicy, PathMapping, RemotePath, Task};
use docdrop_remote::{Connector, Repository};

use crate::error::DeliveryError;
use crate::executor::{self, DeliveryOutcome, DeliveryTarget};
use crate::trigger::{self, ScanOutcome};

/// Knobs for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Resolve and report manifests without connecting, uploading or deleting.
    pub dry_run: bool,
}

/// What happened for one mapping.
#[derive(Debug, Clone, Serialize)]
pub struct MappingReport {
    pub remote: RemotePath,
    pub local: PathBuf,
    /// Distinct directories that had at least one trigger file.
    pub directories: Vec<PathBuf>,
    pub deliveries: Vec<DeliveryOutcome>,
}

impl MappingReport {
    fn idle(mapping: &PathMapping) -> Self {
        Self {
            remote: mapping.remote.clone(),
            local: mapping.local.clone(),
            directories: Vec::new(),
            deliveries: Vec::new(),
        }
    }
}

/// A mapping that failed under [`FailurePolicy::Continue`].
#[derive(Debug, Clone, Serialize)]
pub struct MappingFailure {
    pub remote: RemotePath,
    pub local: PathBuf,
    pub error: String,
}

/// Summary of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub mappings: Vec<MappingReport>,
    pub failures: Vec<MappingFailure>,
}

impl TaskReport {
    pub fn files_delivered(&self) -> usize {
        self.mappings
            .iter()
            .flat_map(|m| &m.deliveries)
            .map(DeliveryOutcome::file_count)
            .sum()
    }
}

/// Run one task.
///
/// Fails immediately if the connection cannot be opened. The session is
/// closed on every path once opened; a failing close is logged and does not
/// change the result.
pub fn run_task(
    task: &Task,
    label: &str,
    connector: &dyn Connector,
    options: RunOptions,
) -> Result<TaskReport, DeliveryError> {
    let started_at = Utc::now();
    let mut report = TaskReport {
        task: label.to_string(),
        dry_run: options.dry_run,
        started_at,
        finished_at: started_at,
        mappings: Vec::new(),
        failures: Vec::new(),
    };

    let mut session: Option<Box<dyn Repository>> = if options.dry_run {
        tracing::info!(task = %label, "dry run, not connecting");
        None
    } else {
        tracing::info!(
            task = %label,
            client_id = %task.auth.client_id,
            data_center = %task.auth.data_center,
            "connecting to remote repository",
        );
        Some(connector.connect(&task.auth).map_err(DeliveryError::Connection)?)
    };

    let result = run_mappings(task, session.as_deref_mut(), &mut report);

    if let Some(mut repository) = session.take() {
        tracing::info!(task = %label, "disconnecting from remote repository");
        if let Err(err) = repository.close() {
            tracing::warn!(task = %label, error = %err, "disconnect failed");
        }
    }

    report.finished_at = Utc::now();
    result.map(|()| report)
}

fn run_mappings(
    task: &Task,
    mut session: Option<&mut (dyn Repository + '_)>,
    report: &mut TaskReport,
) -> Result<(), DeliveryError> {
    for mapping in &task.paths {
        match run_mapping(mapping, session.as_deref_mut()) {
            Ok(mapping_report) => report.mappings.push(mapping_report),
            // An aborting error is logged once, by the caller.
            Err(err) => match task.on_error {
                FailurePolicy::Abort => return Err(err),
                FailurePolicy::Continue => {
                    tracing::error!(
                        remote = %mapping.remote,
                        local = %mapping.local.display(),
                        error = %err,
                        "path mapping failed, continuing",
                    );
                    report.failures.push(MappingFailure {
                        remote: mapping.remote.clone(),
                        local: mapping.local.clone(),
                        error: err.to_string(),
                    });
                }
            },
        }
    }
    Ok(())
}

/// Scan one mapping and deliver each trigger found, in scan order.
pub fn run_mapping(
    mapping: &PathMapping,
    session: Option<&mut (dyn Repository + '_)>,
) -> Result<MappingReport, DeliveryError> {
    let triggers = match trigger::scan(&mapping.local, &mapping.trigger)? {
        ScanOutcome::Skip => {
            tracing::info!(local = %mapping.local.display(), "no trigger files, nothing to do");
            return Ok(MappingReport::idle(mapping));
        }
        ScanOutcome::Proceed(triggers) => triggers,
    };

    let mut report = MappingReport::idle(mapping);
    report.directories = trigger::trigger_directories(&triggers);

    let mut target = match session {
        Some(repository) => {
            let folder = repository
                .get_folder(&mapping.remote)
                .map_err(|source| DeliveryError::FolderLookup {
                    remote: mapping.remote.0.clone(),
                    source,
                })?;
            DeliveryTarget::Live { repository, folder }
        }
        None => DeliveryTarget::DryRun,
    };

    for (index, trigger_file) in triggers.iter().enumerate() {
        let pending = &triggers[index + 1..];
        let outcome = executor::deliver(mapping, &mut target, trigger_file, pending)?;
        report.deliveries.push(outcome);
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// run_all
// ---------------------------------------------------------------------------

/// Result of one task within a pass.
#[derive(Debug, Serialize)]
pub struct TaskResult {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<TaskReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results of a full pass over every configured task.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub tasks: Vec<TaskResult>,
}

impl RunSummary {
    /// `true` if no task errored and no mapping failed.
    pub fn is_success(&self) -> bool {
        self.tasks.iter().all(|t| {
            t.error.is_none() && t.report.as_ref().map_or(true, |r| r.failures.is_empty())
        })
    }

    /// The first error of the pass, for the terminal log line.
    pub fn first_error(&self) -> Option<String> {
        self.tasks.iter().find_map(|t| {
            t.error.clone().or_else(|| {
                t.report
                    .as_ref()
                    .and_then(|r| r.failures.first())
                    .map(|f| format!("{} ({}): {}", t.task, f.remote, f.error))
            })
        })
    }
}

/// Run every task in config order.
///
/// Tasks are independent sessions: a failed task is logged and the next one
/// still runs.
pub fn run_all(config: &Config, connector: &dyn Connector, options: RunOptions) -> RunSummary {
    let mut tasks = Vec::with_capacity(config.tasks.len());
    for (index, task) in config.tasks.iter().enumerate() {
        let label = task.label(index);
        match run_task(task, &label, connector, options) {
            Ok(report) => {
                tracing::info!(
                    task = %label,
                    files = report.files_delivered(),
                    failures = report.failures.len(),
                    "task finished",
                );
                tasks.push(TaskResult {
                    task: label,
                    report: Some(report),
                    error: None,
                });
            }
            Err(err) => {
                tracing::error!(task = %label, error = %err, "task failed");
                tasks.push(TaskResult {
                    task: label,
                    report: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }
    RunSummary { tasks }
}
