//! Build index client.
//!
//! Resolves the newest build of the configured version from the Paper v2
//! build API. Two endpoints are involved:
//!
//! ```text
//! GET <api>/version_group/<major>/builds                             -> index JSON
//! GET <api>/versions/<version>/builds/<build>/downloads/<name>      -> artifact
//! ```
//!
//! Only the first is requested here; the second is constructed and handed to
//! the downloader as part of the [`ResolvedBuild`].
//!
//! # Selection
//!
//! Among the records whose `version` equals the target, the one with the
//! highest build number wins. The server's ordering is not relied on; when
//! two records share a build number the later one in the response is taken.

mod models;

pub use models::{BuildIndex, BuildRecord, Change, Download, Downloads};

use reqwest::Client;
use tracing::info;

use crate::core::{PaperclipError, Result};
use crate::utils::http::get_checked;
use crate::verification::ChecksumVerifier;
use models::RawBuildIndex;

/// The build chosen for installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuild {
    /// The selected build record
    pub record: BuildRecord,
    /// Absolute URL of the server artifact
    pub download_url: String,
    /// Lowercase hex SHA-256 the artifact must hash to
    pub expected_digest: String,
}

impl ResolvedBuild {
    /// Build number of the selected record.
    #[must_use]
    pub fn build_number(&self) -> u64 {
        self.record.build
    }
}

impl BuildIndex {
    /// Parse an index body fetched from `url`.
    ///
    /// # Errors
    ///
    /// [`PaperclipError::MalformedResponse`] when the body is not valid JSON,
    /// a build record is incomplete, or the `versions` list is missing.
    pub fn parse(url: &str, body: &str) -> Result<Self> {
        let raw: RawBuildIndex =
            serde_json::from_str(body).map_err(|e| PaperclipError::MalformedResponse {
                url: url.to_string(),
                reason: format!("invalid builds JSON: {e}"),
            })?;

        let versions = raw.versions.ok_or_else(|| PaperclipError::MalformedResponse {
            url: url.to_string(),
            reason: "version info not found in builds JSON".to_string(),
        })?;

        Ok(Self {
            versions,
            builds: raw.builds,
        })
    }

    /// Whether `version` is listed as a known version.
    #[must_use]
    pub fn knows_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }

    /// Select the latest build for `version`.
    ///
    /// # Errors
    ///
    /// - [`PaperclipError::VersionNotFound`] if `version` is not a known version
    /// - [`PaperclipError::NoCompatibleBuild`] if no record targets `version`
    pub fn select_latest(&self, version: &str) -> Result<&BuildRecord> {
        if !self.knows_version(version) {
            return Err(PaperclipError::VersionNotFound {
                version: version.to_string(),
            });
        }

        // max_by_key keeps the last of equal maxima
        self.builds
            .iter()
            .filter(|b| b.version == version)
            .max_by_key(|b| b.build)
            .ok_or_else(|| PaperclipError::NoCompatibleBuild {
                version: version.to_string(),
            })
    }
}

/// Client for the build index API.
pub struct BuildIndexClient {
    client: Client,
    base_url: String,
}

impl BuildIndexClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `https://api.papermc.io/v2/projects/paper`).
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
        }
    }

    /// URL of the index for a version group.
    #[must_use]
    pub fn index_url(&self, major_version: &str) -> String {
        format!("{}/version_group/{}/builds", self.base_url, major_version)
    }

    /// URL of a build's artifact.
    #[must_use]
    pub fn download_url(&self, version: &str, build: u64, download_name: &str) -> String {
        format!(
            "{}/versions/{}/builds/{}/downloads/{}",
            self.base_url, version, build, download_name
        )
    }

    /// Fetch and parse the index for `major_version`.
    pub async fn fetch_index(&self, major_version: &str) -> Result<BuildIndex> {
        let url = self.index_url(major_version);
        let response = get_checked(&self.client, &url).await?;
        let body = response.text().await.map_err(|e| PaperclipError::transport(&url, &e))?;

        info!("Builds JSON retrieved - parsing JSON...");
        BuildIndex::parse(&url, &body)
    }

    /// Resolve the newest build of `version` within `major_version`.
    ///
    /// Performs exactly one network read and no local I/O.
    ///
    /// # Errors
    ///
    /// - [`PaperclipError::Network`] for transport failures and non-2xx statuses
    /// - [`PaperclipError::MalformedResponse`] for unusable bodies, including a
    ///   selected build whose `sha256` is not 64 hex characters
    /// - [`PaperclipError::VersionNotFound`] / [`PaperclipError::NoCompatibleBuild`]
    ///   as described on [`BuildIndex::select_latest`]
    pub async fn resolve_latest_build(
        &self,
        major_version: &str,
        version: &str,
    ) -> Result<ResolvedBuild> {
        info!(
            "Configuration > Builds URL: {}, Minecraft version: {} - Fetching builds JSON...",
            self.index_url(major_version),
            version
        );

        let index = self.fetch_index(major_version).await?;

        info!("Finding compatible builds in builds JSON for config Minecraft version: {}", version);
        let record = index.select_latest(version)?;

        let expected_digest =
            ChecksumVerifier::normalize_sha256(record.expected_digest()).ok_or_else(|| {
                PaperclipError::MalformedResponse {
                    url: self.index_url(major_version),
                    reason: format!(
                        "build {} has an invalid sha256 '{}'",
                        record.build,
                        record.expected_digest()
                    ),
                }
            })?;

        let download_url = self.download_url(version, record.build, record.download_name());

        info!(
            "Latest compatible build > Build: {}, Time: {}, Download URL: {}",
            record.build,
            record.time,
            download_url
        );
        info!("Changes: {}", join_summaries(record));

        Ok(ResolvedBuild {
            record: record.clone(),
            download_url,
            expected_digest,
        })
    }
}

fn join_summaries(record: &BuildRecord) -> String {
    let summaries: Vec<&str> = record.change_summaries().collect();
    if summaries.is_empty() {
        "(none)".to_string()
    } else {
        summaries.join(", ")
    }
}
