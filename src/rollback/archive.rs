// src/rollback/archive.rs

//! Access to the history archive of past releases.
//!
//! The archive holds one JSON document per canonical codename: an array of
//! every release ever published for that device, across branches and
//! regions. It is append-only and read fresh for each lookup.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default location of the per-device history documents
pub const DEFAULT_ARCHIVE_URL_TEMPLATE: &str = "https://raw.githubusercontent.com/XiaomiFirmwareUpdater/xiaomifirmwareupdater.github.io/master/data/devices/full/{codename}.json";

/// Placeholder replaced by the canonical codename
pub const CODENAME_PLACEHOLDER: &str = "{codename}";

/// One past release in the archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveEntry {
    /// "stable" or "weekly"
    pub branch: String,

    /// "Global" or "China"
    #[serde(rename = "type")]
    pub region: String,

    pub versions: ArchiveVersions,
}

/// Version strings of an archived release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveVersions {
    pub miui: String,
}

/// Why an archive lookup produced no history
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Connection failure or timeout
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The server answered with a non-success status (404 for new devices)
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The document is not a JSON array
    #[error("malformed archive document: {0}")]
    Parse(String),
}

/// A source of archived releases, keyed by canonical codename
pub trait ArchiveSource {
    /// Fetch every archived release of a device. One attempt, no retry.
    fn fetch(&self, codename: &str) -> Result<Vec<ArchiveEntry>, ArchiveError>;
}

/// Parse an archive document
///
/// Entries that do not have the expected shape are skipped rather than
/// voiding the rest of the document.
pub fn parse_archive(body: &str) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| ArchiveError::Parse(e.to_string()))?;
    let total = values.len();

    let entries: Vec<ArchiveEntry> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if entries.len() != total {
        debug!("Skipped {} malformed archive entries", total - entries.len());
    }
    Ok(entries)
}

/// Archive served over HTTP
pub struct HttpArchive {
    client: Client,
    url_template: String,
}

impl HttpArchive {
    pub fn new(client: Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    /// URL of the history document for a codename
    pub fn url_for(&self, codename: &str) -> String {
        self.url_template.replace(CODENAME_PLACEHOLDER, codename)
    }
}

impl ArchiveSource for HttpArchive {
    fn fetch(&self, codename: &str) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        let url = self.url_for(codename);
        debug!("Fetching release history from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ArchiveError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| ArchiveError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        parse_archive(&body)
    }
}
