//! The updater configuration document.
//!
//! Loaded once at startup from JSON and immutable for the rest of the run.
//! Key names follow the file format users already have on disk:
//!
//! ```json
//! {
//!   "minecraftVersion": { "major": "1.20", "minor": "4" },
//!   "serverFile": "server.jar",
//!   "tempFile": "server.jar.tmp"
//! }
//! ```
//!
//! `targetVersion`, `installPath` and `tempPath` are accepted as aliases, and
//! an optional `apiBaseUrl` points the updater at a different build API.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::constants::DEFAULT_API_BASE_URL;
use crate::core::{PaperclipError, Result};
use crate::utils::lock::RunLock;

/// The version line and version the updater tracks.
///
/// `major` selects the version group queried from the build index (e.g.
/// `"1.20"`); `minor` is appended to it to form the exact version string
/// (`"1.20.4"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetVersion {
    /// Version group, e.g. `"1.20"`
    pub major: String,
    /// Patch component within the group, e.g. `"4"`
    pub minor: String,
}

impl TargetVersion {
    /// The exact version string builds are matched against.
    #[must_use]
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

/// Configuration for a single update run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdaterConfig {
    /// Version the installed artifact should track.
    #[serde(rename = "minecraftVersion", alias = "targetVersion")]
    pub target_version: TargetVersion,

    /// Location of the installed artifact. Only replaced after a verified
    /// download.
    #[serde(rename = "serverFile", alias = "installPath")]
    pub install_path: PathBuf,

    /// Scratch file the download is streamed into. Removed at the end of
    /// every run.
    #[serde(rename = "tempFile", alias = "tempPath")]
    pub temp_path: PathBuf,

    /// Project root of the build API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl UpdaterConfig {
    /// Create a configuration pointing at the default build API.
    pub fn new(
        target_version: TargetVersion,
        install_path: impl Into<PathBuf>,
        temp_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target_version,
            install_path: install_path.into(),
            temp_path: temp_path.into(),
            api_base_url: default_api_base_url(),
        }
    }

    /// Replace the build API root.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Read, parse and validate the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Every failure is a [`PaperclipError::Config`]: the file is missing or
    /// unreadable, the JSON is invalid or incomplete, or [`validate`] rejects
    /// the values.
    ///
    /// [`validate`]: Self::validate
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let content = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PaperclipError::config(format!("Configuration file not found: {}", path.display()))
            } else {
                PaperclipError::config(format!("Failed to read {}: {e}", path.display()))
            }
        })?;

        Self::parse(&content, path)
    }

    /// Parse and validate configuration JSON. `source` is only used in
    /// error messages.
    pub fn parse(content: &str, source: &Path) -> Result<Self> {
        let config: Self = serde_json::from_str(content).map_err(|e| {
            PaperclipError::config(format!("Failed to parse {}: {e}", source.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a run depends on.
    ///
    /// Paths are compared after resolving them against the working
    /// directory and the file system, so `server.jar`, `./server.jar` and
    /// `cache/../server.jar` all name the same file.
    ///
    /// # Errors
    ///
    /// Returns [`PaperclipError::Config`] when a version component or path is
    /// empty, when the temp path names the install path or its run lock
    /// file, or when `apiBaseUrl` is not an absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<()> {
        if self.target_version.major.trim().is_empty() {
            return Err(PaperclipError::config("minecraftVersion.major must not be empty"));
        }
        if self.target_version.minor.trim().is_empty() {
            return Err(PaperclipError::config("minecraftVersion.minor must not be empty"));
        }
        if self.install_path.as_os_str().is_empty() {
            return Err(PaperclipError::config("serverFile must not be empty"));
        }
        if self.temp_path.as_os_str().is_empty() {
            return Err(PaperclipError::config("tempFile must not be empty"));
        }
        let install = resolve_path(&self.install_path)?;
        let temp = resolve_path(&self.temp_path)?;
        if install == temp {
            return Err(PaperclipError::config(format!(
                "serverFile and tempFile must differ (both are {})",
                install.display()
            )));
        }
        if temp == RunLock::lock_path(&install) {
            return Err(PaperclipError::config(format!(
                "tempFile must not be the run lock file {}",
                temp.display()
            )));
        }

        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            PaperclipError::config(format!("apiBaseUrl '{}' is not a URL: {e}", self.api_base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PaperclipError::config(format!(
                "apiBaseUrl must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// The version group queried from the build index.
    #[must_use]
    pub fn major_version(&self) -> &str {
        &self.target_version.major
    }

    /// The exact version string builds must match.
    #[must_use]
    pub fn target_version_string(&self) -> String {
        self.target_version.version_string()
    }

    /// The build API root without a trailing slash.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

/// Absolute form of `path` with its deepest existing ancestor canonicalized
/// and the remaining components normalized lexically.
///
/// Components that do not exist yet cannot be symlinks, so `.` and `..`
/// among them are safe to fold without touching the file system.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| {
        PaperclipError::config(format!("Cannot resolve path {}: {e}", path.display()))
    })?;
    let components: Vec<Component<'_>> = absolute.components().collect();

    let mut resolved = PathBuf::new();
    let mut rest: &[Component<'_>] = &components;
    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        if let Ok(canonical) = std::fs::canonicalize(&prefix) {
            resolved = canonical;
            rest = &components[split..];
            break;
        }
    }

    for component in rest {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}
