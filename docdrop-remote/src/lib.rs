//! # docdrop-remote
//!
//! The seam between the delivery pipeline and the remote document repository.
//!
//! [`Connector`] opens a session from a task's [`Credentials`], yielding a
//! [`Repository`] that resolves folders and uploads documents. [`HttpConnector`]
//! is the production implementation; tests substitute in-memory fakes.
//!
//! [`Credentials`]: docdrop_core::Credentials

pub mod error;
pub mod http;
pub mod repository;

pub use error::RemoteError;
pub use http::{endpoints_for, HttpConnector};
pub use repository::{Connector, DocumentMeta, FolderHandle, Repository};
