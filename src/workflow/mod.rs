//! The update workflow.
//!
//! One run walks a fixed sequence of states:
//!
//! ```text
//! START -> INDEX_RESOLVED -> ALREADY_CURRENT ---------------------------------> DONE
//!                        \-> DOWNLOADING -> DOWNLOADED -> VERIFIED -> INSTALLED -> DONE
//!
//! any state --(error)--> ERROR   (terminal, nothing is retried)
//! ```
//!
//! # Guarantees
//!
//! - The installed artifact is only touched by the `VERIFIED -> INSTALLED`
//!   step, and that step is an atomic rename. Every earlier failure leaves
//!   it exactly as it was.
//! - The temp file is owned by a [`TempFileGuard`] for the whole run and is
//!   removed on every exit path, including early returns.
//! - The expected digest travels inside [`ResolvedBuild`] and is passed to
//!   each verification explicitly.
//! - Operations are awaited one after another; there is never more than one
//!   request or file operation in flight.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::config::UpdaterConfig;
use crate::core::{PaperclipError, Result};
use crate::download::ArtifactDownloader;
use crate::index::{BuildIndexClient, ResolvedBuild};
use crate::utils::fs::{TempFileGuard, atomic_replace};
use crate::utils::http::build_client;
use crate::utils::lock::RunLock;
use crate::verification::{ChecksumVerifier, DigestCheck};

/// States of an update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    IndexResolved,
    AlreadyCurrent,
    Downloading,
    Downloaded,
    Verified,
    Installed,
    Done,
    Error,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::IndexResolved => "INDEX_RESOLVED",
            Self::AlreadyCurrent => "ALREADY_CURRENT",
            Self::Downloading => "DOWNLOADING",
            Self::Downloaded => "DOWNLOADED",
            Self::Verified => "VERIFIED",
            Self::Installed => "INSTALLED",
            Self::Done => "DONE",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The installed artifact already matched the latest build.
    AlreadyCurrent,
    /// A new artifact was downloaded, verified and installed.
    Installed,
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub outcome: UpdateOutcome,
    /// The build the installed artifact now corresponds to
    pub build: ResolvedBuild,
    /// Bytes downloaded, zero when already current
    pub bytes_downloaded: u64,
    /// Wall-clock time spent in [`UpdateWorkflow::run`]
    pub elapsed: Duration,
    /// States visited, in order, ending with [`WorkflowState::Done`]
    pub states: Vec<WorkflowState>,
}

/// Records state transitions and logs them.
#[derive(Debug, Default)]
struct Transitions {
    states: Vec<WorkflowState>,
}

impl Transitions {
    fn enter(&mut self, state: WorkflowState) {
        debug!("Workflow state -> {}", state);
        self.states.push(state);
    }

    fn current(&self) -> WorkflowState {
        self.states.last().copied().unwrap_or(WorkflowState::Start)
    }
}

/// Orchestrates index resolution, download, verification and install.
pub struct UpdateWorkflow {
    config: UpdaterConfig,
    index: BuildIndexClient,
    downloader: ArtifactDownloader,
    use_run_lock: bool,
}

impl UpdateWorkflow {
    /// Create a workflow for `config` with a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`PaperclipError::Config`] if `config` fails
    /// [`UpdaterConfig::validate`], so a run never starts with a temp path
    /// that aliases the install path.
    pub fn new(config: UpdaterConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client()?;
        let index = BuildIndexClient::new(client.clone(), config.api_base_url());
        let downloader = ArtifactDownloader::new(client);

        Ok(Self {
            config,
            index,
            downloader,
            use_run_lock: true,
        })
    }

    /// Enable or disable the advisory run lock (enabled by default).
    #[must_use]
    pub fn with_run_lock(mut self, enabled: bool) -> Self {
        self.use_run_lock = enabled;
        self
    }

    #[must_use]
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Execute one update run.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; the run is then in
    /// [`WorkflowState::Error`]. See [`PaperclipError`] for the categories.
    /// A digest mismatch on the downloaded file is reported as
    /// [`PaperclipError::ChecksumMismatch`].
    pub async fn run(&self) -> Result<WorkflowReport> {
        let started = Instant::now();
        let mut transitions = Transitions::default();

        match self.run_states(&mut transitions, started).await {
            Ok(report) => Ok(report),
            Err(e) => {
                debug!("Workflow state -> {}", WorkflowState::Error);
                error!("Update failed after {}: {}", transitions.current(), e);
                Err(e)
            }
        }
    }

    async fn run_states(
        &self,
        transitions: &mut Transitions,
        started: Instant,
    ) -> Result<WorkflowReport> {
        let install_path = self.config.install_path.as_path();

        let _lock = if self.use_run_lock {
            Some(RunLock::acquire(install_path).await?)
        } else {
            None
        };

        // Owns the temp path from here on, including stale files from a crashed run
        let temp = TempFileGuard::new(&self.config.temp_path);
        transitions.enter(WorkflowState::Start);

        let version = self.config.target_version_string();
        let build =
            self.index.resolve_latest_build(self.config.major_version(), &version).await?;
        transitions.enter(WorkflowState::IndexResolved);

        if ChecksumVerifier::verify(install_path, &build.expected_digest).await? {
            info!("Latest compatible build already installed");
            transitions.enter(WorkflowState::AlreadyCurrent);

            info!("Cleaning up...");
            temp.cleanup();
            transitions.enter(WorkflowState::Done);

            return Ok(WorkflowReport {
                outcome: UpdateOutcome::AlreadyCurrent,
                build,
                bytes_downloaded: 0,
                elapsed: started.elapsed(),
                states: std::mem::take(&mut transitions.states),
            });
        }

        transitions.enter(WorkflowState::Downloading);
        info!("Downloading latest compatible build...");
        let bytes_downloaded = self.downloader.download(&build.download_url, temp.path()).await?;
        transitions.enter(WorkflowState::Downloaded);

        info!("Verifying downloaded latest build with SHA256...");
        match ChecksumVerifier::check(temp.path(), &build.expected_digest).await? {
            DigestCheck::Match => {}
            DigestCheck::Missing => {
                error!("Verification unsuccessful");
                return Err(PaperclipError::ChecksumMismatch {
                    path: temp.path().to_path_buf(),
                    expected: build.expected_digest.clone(),
                    actual: None,
                });
            }
            DigestCheck::Mismatch {
                actual,
            } => {
                error!("Verification unsuccessful");
                return Err(PaperclipError::ChecksumMismatch {
                    path: temp.path().to_path_buf(),
                    expected: build.expected_digest.clone(),
                    actual: Some(actual),
                });
            }
        }
        transitions.enter(WorkflowState::Verified);

        info!("Verification successful - Copying temp file to server file...");
        install(temp.path(), install_path).await?;
        transitions.enter(WorkflowState::Installed);

        info!("Cleaning up...");
        temp.cleanup();
        transitions.enter(WorkflowState::Done);

        Ok(WorkflowReport {
            outcome: UpdateOutcome::Installed,
            build,
            bytes_downloaded,
            elapsed: started.elapsed(),
            states: std::mem::take(&mut transitions.states),
        })
    }
}

/// Atomically replace `install_path` with `temp_path` on the blocking pool.
async fn install(temp_path: &Path, install_path: &Path) -> Result<()> {
    let src = temp_path.to_path_buf();
    let dest = install_path.to_path_buf();

    tokio::task::spawn_blocking(move || atomic_replace(&src, &dest)).await.map_err(|e| {
        PaperclipError::file_system("install", install_path, std::io::Error::other(e))
    })?
}
