//! Remote repository traits and the handles passed across them.

use std::io::Read;
use std::path::Path;

use serde::Serialize;

use docdrop_core::{Credentials, RemotePath};

use crate::error::RemoteError;

/// A resolved destination folder. Resolved once per path mapping and reused
/// for every upload in that mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderHandle {
    /// Repository-side identifier used to address uploads.
    pub id: String,
    pub path: RemotePath,
}

/// Metadata sent alongside an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    /// Base filename, e.g. `report.pdf`.
    pub name: String,
    /// Lowercase text after the final `.` of the filename, or empty.
    pub file_type: String,
}

impl DocumentMeta {
    /// Derive the metadata for a local file.
    pub fn for_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_type = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        Self { name, file_type }
    }
}

/// An open session against the remote repository.
///
/// Calls are issued strictly one after another; implementations need no
/// internal synchronization.
pub trait Repository {
    /// Look up a folder by its remote path.
    ///
    /// Returns [`RemoteError::NotFound`] if it does not exist.
    fn get_folder(&mut self, path: &RemotePath) -> Result<FolderHandle, RemoteError>;

    /// Stream one document into `folder`.
    fn upload_document(
        &mut self,
        folder: &FolderHandle,
        body: &mut dyn Read,
        meta: &DocumentMeta,
    ) -> Result<(), RemoteError>;

    /// End the session. Called exactly once per session.
    fn close(&mut self) -> Result<(), RemoteError>;
}

/// Opens [`Repository`] sessions.
pub trait Connector {
    fn connect(&self, auth: &Credentials) -> Result<Box<dyn Repository>, RemoteError>;
}
