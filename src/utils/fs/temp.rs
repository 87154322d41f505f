//! Scoped ownership of the download temp file.
//!
//! [`TempFileGuard`] removes its file when dropped, so every exit path of
//! the workflow (success, verification failure, download error, early `?`)
//! leaves no scratch file behind without threading cleanup calls through
//! each branch.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Deletes a file when it goes out of scope.
///
/// A file that does not exist at drop time is fine. Any other removal
/// failure is logged as a warning and otherwise ignored.
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    /// Take ownership of `path` for the rest of the scope.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now instead of at the end of the scope.
    pub fn cleanup(self) {
        // Drop does the work
        drop(self);
    }

    fn remove(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temp file {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        self.remove();
    }
}
