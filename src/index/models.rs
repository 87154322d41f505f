//! Wire types of the build index document.
//!
//! Only the fields the updater consumes are modelled; anything else the API
//! sends (channels, promotion flags, extra downloads) is ignored.

use serde::{Deserialize, Serialize};

/// Body of `GET <api>/version_group/<major>/builds` as sent by the server.
///
/// `versions` is optional here so that a body without it can be reported
/// as malformed rather than as a generic parse failure.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawBuildIndex {
    pub versions: Option<Vec<String>>,
    #[serde(default)]
    pub builds: Vec<BuildRecord>,
}

/// A parsed build index for one version group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIndex {
    /// Every version string the group contains
    pub versions: Vec<String>,
    /// Published builds in server order
    pub builds: Vec<BuildRecord>,
}

/// One published build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Version string the build targets (e.g. `"1.20.4"`)
    pub version: String,
    /// Build number, increasing within a version
    pub build: u64,
    /// Publication time exactly as the server sent it; only logged
    #[serde(default)]
    pub time: String,
    /// Commits that went into the build
    #[serde(default)]
    pub changes: Vec<Change>,
    /// Downloadable files of the build
    pub downloads: Downloads,
}

/// A change included in a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// One-line summary of the change
    #[serde(default)]
    pub summary: String,
}

/// Downloads attached to a build. Only the server jar is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downloads {
    /// The server artifact
    pub application: Download,
}

/// A single downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    /// File name used in the download URL
    pub name: String,
    /// Hex SHA-256 of the file
    pub sha256: String,
}

impl BuildRecord {
    /// File name of the server artifact.
    #[must_use]
    pub fn download_name(&self) -> &str {
        &self.downloads.application.name
    }

    /// Digest published for the server artifact, as sent.
    #[must_use]
    pub fn expected_digest(&self) -> &str {
        &self.downloads.application.sha256
    }

    /// Change summaries in order.
    pub fn change_summaries(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|c| c.summary.as_str())
    }
}
