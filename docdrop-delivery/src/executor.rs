//! Delivery of one trigger file's directory.
//!
//! ## `deliver` — step order
//!
//! 1. Skip if the trigger has already been consumed.
//! 2. Resolve the manifest of the trigger's directory.
//! 3. Upload every manifest file, in manifest order.
//! 4. Delete the trigger file.
//! 5. With `delete: true`, remove the directory.
//!
//! Subdirectories holding a trigger that is still pending in the current scan
//! survive step 5; they are removed by their own delivery.
//!
//! The trigger is only removed after every upload succeeded. Any failure
//! returns early and leaves it in place, so the next run redelivers the whole
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use docdrop_core::PathMapping;
use docdrop_remote::{DocumentMeta, FolderHandle, Repository};

use crate::error::{io_err, DeliveryError};
use crate::manifest;

/// Where uploads go for one mapping.
pub enum DeliveryTarget<'a> {
    /// Upload through an open session into the mapping's resolved folder.
    Live {
        repository: &'a mut dyn Repository,
        folder: FolderHandle,
    },
    /// Resolve and report only; nothing is uploaded or deleted.
    DryRun,
}

/// Outcome of a single trigger file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Every manifest file was uploaded and the trigger removed.
    Delivered {
        trigger: PathBuf,
        files: Vec<PathBuf>,
        directory_removed: bool,
    },
    /// Dry run: these files would have been uploaded.
    WouldDeliver { trigger: PathBuf, files: Vec<PathBuf> },
    /// The trigger disappeared before its turn, typically because an earlier
    /// trigger in the same directory removed it.
    Vanished { trigger: PathBuf },
}

impl DeliveryOutcome {
    pub fn trigger(&self) -> &Path {
        match self {
            DeliveryOutcome::Delivered { trigger, .. }
            | DeliveryOutcome::WouldDeliver { trigger, .. }
            | DeliveryOutcome::Vanished { trigger } => trigger,
        }
    }

    /// Number of files uploaded (or that would be, in a dry run).
    pub fn file_count(&self) -> usize {
        match self {
            DeliveryOutcome::Delivered { files, .. } | DeliveryOutcome::WouldDeliver { files, .. } => {
                files.len()
            }
            DeliveryOutcome::Vanished { .. } => 0,
        }
    }
}

/// Deliver the directory guarded by `trigger`.
///
/// `pending` lists the triggers of the same scan that have not been delivered
/// yet.
pub fn deliver(
    mapping: &PathMapping,
    target: &mut DeliveryTarget<'_>,
    trigger: &Path,
    pending: &[PathBuf],
) -> Result<DeliveryOutcome, DeliveryError> {
    if !trigger.exists() {
        tracing::info!(trigger = %trigger.display(), "trigger file already consumed, skipping");
        return Ok(DeliveryOutcome::Vanished {
            trigger: trigger.to_path_buf(),
        });
    }

    let directory = trigger.parent().unwrap_or(&mapping.local);
    let filter_in = mapping.filter.include.patterns("filter.in")?;
    let filter_out = mapping.filter.exclude.patterns("filter.out")?;
    let files = manifest::resolve(directory, &filter_in, &filter_out)?;

    tracing::info!(
        trigger = %trigger.display(),
        files = ?files,
        "upload manifest",
    );

    let (repository, folder) = match target {
        DeliveryTarget::Live { repository, folder } => (&mut **repository, &*folder),
        DeliveryTarget::DryRun => {
            for file in &files {
                tracing::info!(file = %file.display(), destination = %mapping.remote, "[dry-run] would upload");
            }
            return Ok(DeliveryOutcome::WouldDeliver {
                trigger: trigger.to_path_buf(),
                files,
            });
        }
    };

    for file in &files {
        upload_file(repository, folder, file)?;
    }

    fs::remove_file(trigger).map_err(|e| io_err(trigger, e))?;
    tracing::info!(trigger = %trigger.display(), "removed trigger file");

    let directory_removed = if mapping.delete {
        remove_directory(directory, &mapping.local, pending)?;
        true
    } else {
        false
    };

    Ok(DeliveryOutcome::Delivered {
        trigger: trigger.to_path_buf(),
        files,
        directory_removed,
    })
}

fn upload_file(
    repository: &mut dyn Repository,
    folder: &FolderHandle,
    file: &Path,
) -> Result<(), DeliveryError> {
    let meta = DocumentMeta::for_path(file);
    tracing::info!(
        file = %file.display(),
        destination = %folder.path,
        file_type = %meta.file_type,
        "uploading",
    );
    let mut body = fs::File::open(file).map_err(|e| io_err(file, e))?;
    repository
        .upload_document(folder, &mut body, &meta)
        .map_err(|source| DeliveryError::Upload {
            path: file.to_path_buf(),
            source,
        })
}

/// Remove a delivered directory.
///
/// The mapping root itself is emptied rather than removed, so the next scan
/// still has a directory to list. Subdirectories containing a pending trigger
/// are left in place.
fn remove_directory(
    directory: &Path,
    local_root: &Path,
    pending: &[PathBuf],
) -> Result<(), DeliveryError> {
    let keep: Vec<&Path> = pending
        .iter()
        .filter_map(|t| t.parent())
        .filter(|d| *d != directory && d.starts_with(directory))
        .collect();

    if directory != local_root && keep.is_empty() {
        fs::remove_dir_all(directory).map_err(|e| io_err(directory, e))?;
        tracing::info!(directory = %directory.display(), "removed delivered directory");
        return Ok(());
    }

    prune(directory, &keep)?;
    if keep.is_empty() {
        tracing::info!(directory = %directory.display(), "emptied delivered root directory");
    } else {
        tracing::info!(
            directory = %directory.display(),
            kept = ?keep,
            "emptied delivered directory, kept subdirectories with pending triggers",
        );
    }
    Ok(())
}

/// Remove everything under `directory` except the `keep` directories and
/// their ancestors.
fn prune(directory: &Path, keep: &[&Path]) -> Result<(), DeliveryError> {
    for entry in fs::read_dir(directory).map_err(|e| io_err(directory, e))? {
        let entry = entry.map_err(|e| io_err(directory, e))?;
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map(|t| t.is_dir())
            .map_err(|e| io_err(&path, e))?;
        if !is_dir {
            fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
        } else if keep.iter().any(|k| *k == path) {
            continue;
        } else if keep.iter().any(|k| k.starts_with(&path)) {
            prune(&path, keep)?;
        } else {
            fs::remove_dir_all(&path).map_err(|e| io_err(&path, e))?;
        }
    }
    Ok(())
}
