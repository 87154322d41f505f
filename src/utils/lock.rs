//! Advisory lock serialising concurrent runs.
//!
//! Two invocations updating the same install path would race on the
//! temp/install pair. [`RunLock`] takes an exclusive OS-level lock on a
//! sibling `<install path>.lock` file for the lifetime of a run, so a second
//! invocation waits until the first has finished.
//!
//! The lock file itself is left on disk; only the lock is released.

use fs4::fs_std::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::LOCK_FILE_SUFFIX;
use crate::core::{PaperclipError, Result};

/// Exclusive lock held for the duration of an update run.
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Lock file path guarding `install_path`.
    #[must_use]
    pub fn lock_path(install_path: &Path) -> PathBuf {
        let mut name = OsString::from(install_path.as_os_str());
        name.push(LOCK_FILE_SUFFIX);
        PathBuf::from(name)
    }

    /// Block until the lock for `install_path` is acquired.
    ///
    /// The blocking lock call runs on tokio's blocking pool.
    pub async fn acquire(install_path: &Path) -> Result<Self> {
        let lock_path = Self::lock_path(install_path);

        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PaperclipError::file_system("create directory", parent, e))?;
        }

        let path = lock_path.clone();
        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&path)
                .map_err(|e| PaperclipError::file_system("open lock file", &path, e))?;

            file.lock_exclusive()
                .map_err(|e| PaperclipError::file_system("lock", &path, e))?;

            Ok(file)
        })
        .await
        .map_err(|e| PaperclipError::file_system("lock", &lock_path, std::io::Error::other(e)))??;

        debug!("Acquired run lock {}", lock_path.display());
        Ok(Self {
            file,
            path: lock_path,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // Closing the file releases the lock too
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}
