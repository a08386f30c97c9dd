//! HTTPS client for the remote document repository.
//!
//! Endpoint layout (REST v201606):
//!
//! ```text
//! POST {auth_url}                                  client-credentials login
//! GET  {api_url}/folders?path=<remote>             folder lookup
//! POST {upload_url}/folders/<id>/documents?name=…  streaming upload
//! ```
//!
//! Unless the task config spells the endpoints out, they are derived from the
//! data center name (`na11`, `uatna11`, `eu11`, …).

use std::io::Read;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use docdrop_core::{Credentials, Endpoints, RemotePath};

use crate::error::RemoteError;
use crate::repository::{Connector, DocumentMeta, FolderHandle, Repository};

const API_VERSION: &str = "v201606";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Endpoints for a task, explicit ones first.
pub fn endpoints_for(auth: &Credentials) -> Endpoints {
    if let Some(endpoints) = &auth.endpoints {
        return endpoints.clone();
    }
    let dc = auth.data_center.trim().to_ascii_lowercase();
    let auth_host = if dc.starts_with("uat") {
        "authuat"
    } else {
        "auth"
    };
    Endpoints {
        auth_url: format!("https://{auth_host}.springcm.com/api/{API_VERSION}/apiuser"),
        api_url: format!("https://api{dc}.springcm.com/{API_VERSION}"),
        upload_url: format!("https://apiupload{dc}.springcm.com/{API_VERSION}"),
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Opens authenticated HTTPS sessions.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout: Duration,
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-request timeout (connect + transfer).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FolderResponse {
    #[serde(rename = "Href")]
    href: String,
}

impl Connector for HttpConnector {
    fn connect(&self, auth: &Credentials) -> Result<Box<dyn Repository>, RemoteError> {
        let endpoints = endpoints_for(auth);
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();

        tracing::debug!(url = %endpoints.auth_url, "requesting access token");
        let response = agent
            .post(&endpoints.auth_url)
            .send_json(json!({
                "client_id": auth.client_id,
                "client_secret": auth.client_secret,
            }))
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => RemoteError::Connection(format!(
                    "login rejected with HTTP {status}: {}",
                    error_excerpt(response)
                )),
                ureq::Error::Transport(transport) => RemoteError::Connection(transport.to_string()),
            })?;
        let token: TokenResponse = response.into_json().map_err(|source| RemoteError::Decode {
            url: endpoints.auth_url.clone(),
            source,
        })?;
        tracing::debug!(api = %endpoints.api_url, "access token acquired");

        Ok(Box::new(HttpRepository {
            agent,
            endpoints,
            token: Some(token.access_token),
        }))
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

struct HttpRepository {
    agent: ureq::Agent,
    endpoints: Endpoints,
    /// `None` once closed.
    token: Option<String>,
}

impl HttpRepository {
    fn bearer(&self) -> Result<String, RemoteError> {
        self.token
            .as_ref()
            .map(|t| format!("bearer {t}"))
            .ok_or(RemoteError::Closed)
    }
}

impl Repository for HttpRepository {
    fn get_folder(&mut self, path: &RemotePath) -> Result<FolderHandle, RemoteError> {
        let url = format!("{}/folders", self.endpoints.api_url);
        let response = self
            .agent
            .get(&url)
            .query("path", &path.0)
            .set("Authorization", &self.bearer()?)
            .set("Accept", "application/json")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(404, _) => RemoteError::NotFound {
                    path: path.0.clone(),
                },
                other => map_ureq_error(&url, other),
            })?;
        let folder: FolderResponse = response
            .into_json()
            .map_err(|source| RemoteError::Decode {
                url: url.clone(),
                source,
            })?;
        let id = folder_id_from_href(&folder.href).ok_or_else(|| RemoteError::Decode {
            url,
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("folder href has no id: {}", folder.href),
            ),
        })?;

        Ok(FolderHandle {
            id,
            path: path.clone(),
        })
    }

    fn upload_document(
        &mut self,
        folder: &FolderHandle,
        body: &mut dyn Read,
        meta: &DocumentMeta,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/folders/{}/documents", self.endpoints.upload_url, folder.id);
        self.agent
            .post(&url)
            .query("name", &meta.name)
            .query("fileType", &meta.file_type)
            .set("Authorization", &self.bearer()?)
            .set("Content-Type", "application/octet-stream")
            .send(body)
            .map_err(|err| map_ureq_error(&url, err))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        // Tokens expire server-side; dropping ours ends the session.
        match self.token.take() {
            Some(_) => Ok(()),
            None => Err(RemoteError::Closed),
        }
    }
}

fn map_ureq_error(url: &str, err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(status, response) => RemoteError::Http {
            status,
            url: url.to_string(),
            message: error_excerpt(response),
        },
        ureq::Error::Transport(transport) => RemoteError::Transport(transport.to_string()),
    }
}

/// First line of an error body, capped so logs stay readable.
fn error_excerpt(response: ureq::Response) -> String {
    let body = response.into_string().unwrap_or_default();
    let line = body.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return "<empty body>".to_string();
    }
    line.chars().take(200).collect()
}

/// `https://host/v201606/folders/<id>` → `<id>`.
fn folder_id_from_href(href: &str) -> Option<String> {
    let id = href.trim_end_matches('/').rsplit('/').next()?;
    let id = id.split(['?', '#']).next()?;
    if id.is_empty() || id == "folders" {
        return None;
    }
    Some(id.to_string())
}
