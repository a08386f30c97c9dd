//! Shared fixtures: a recording in-memory repository and on-disk trees.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use docdrop_core::{Credentials, FailurePolicy, Filter, PathMapping, PatternSpec, RemotePath, Task};
use docdrop_remote::{Connector, DocumentMeta, FolderHandle, RemoteError, Repository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub folder_id: String,
    pub name: String,
    pub file_type: String,
    pub body: Vec<u8>,
}

/// Everything the fake saw, shared between connector and sessions.
#[derive(Debug, Default)]
pub struct Journal {
    pub connects: usize,
    pub closes: usize,
    pub folder_lookups: Vec<String>,
    pub uploads: Vec<Upload>,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    pub journal: Rc<RefCell<Journal>>,
    pub refuse_connect: bool,
    pub fail_close: bool,
    /// Uploads of a file with this base name fail with HTTP 500.
    pub fail_upload_of: Option<String>,
    /// Remote paths that do not exist.
    pub missing_folders: Vec<String>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.journal
            .borrow()
            .uploads
            .iter()
            .map(|u| u.name.clone())
            .collect()
    }

    pub fn upload_count(&self) -> usize {
        self.journal.borrow().uploads.len()
    }
}

impl Connector for FakeConnector {
    fn connect(&self, _auth: &Credentials) -> Result<Box<dyn Repository>, RemoteError> {
        if self.refuse_connect {
            return Err(RemoteError::Connection("login rejected with HTTP 401".into()));
        }
        self.journal.borrow_mut().connects += 1;
        Ok(Box::new(FakeRepository {
            connector: self.clone(),
        }))
    }
}

struct FakeRepository {
    connector: FakeConnector,
}

impl Repository for FakeRepository {
    fn get_folder(&mut self, path: &RemotePath) -> Result<FolderHandle, RemoteError> {
        self.connector
            .journal
            .borrow_mut()
            .folder_lookups
            .push(path.0.clone());
        if self.connector.missing_folders.contains(&path.0) {
            return Err(RemoteError::NotFound {
                path: path.0.clone(),
            });
        }
        Ok(FolderHandle {
            id: format!("id:{}", path.0),
            path: path.clone(),
        })
    }

    fn upload_document(
        &mut self,
        folder: &FolderHandle,
        body: &mut dyn Read,
        meta: &DocumentMeta,
    ) -> Result<(), RemoteError> {
        if self.connector.fail_upload_of.as_deref() == Some(meta.name.as_str()) {
            return Err(RemoteError::Http {
                status: 500,
                url: format!("fake://{}", folder.id),
                message: "internal error".into(),
            });
        }
        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes).expect("read upload body");
        self.connector.journal.borrow_mut().uploads.push(Upload {
            folder_id: folder.id.clone(),
            name: meta.name.clone(),
            file_type: meta.file_type.clone(),
            body: bytes,
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        self.connector.journal.borrow_mut().closes += 1;
        if self.connector.fail_close {
            return Err(RemoteError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn write_files(root: &Path, files: &[&str]) {
    for rel in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, format!("contents of {rel}")).expect("write");
    }
}

pub fn mapping(
    remote: &str,
    local: &Path,
    trigger: &str,
    filter_in: &[&str],
    filter_out: &[&str],
    delete: bool,
) -> PathMapping {
    PathMapping {
        remote: RemotePath::from(remote),
        local: local.to_path_buf(),
        trigger: PatternSpec::from(trigger),
        filter: Filter {
            include: PatternSpec::from(filter_in.to_vec()),
            exclude: PatternSpec::from(filter_out.to_vec()),
        },
        delete,
    }
}

pub fn task(paths: Vec<PathMapping>, on_error: FailurePolicy) -> Task {
    Task {
        name: Some("test".into()),
        auth: Credentials {
            client_id: "client".into(),
            client_secret: "secret".into(),
            data_center: "na11".into(),
            endpoints: None,
        },
        on_error,
        paths,
    }
}

pub fn p(root: &Path, rel: &str) -> PathBuf {
    root.join(rel)
}
