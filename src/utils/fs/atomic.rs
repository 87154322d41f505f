//! Atomic file replacement using a stage-then-rename strategy.
//!
//! The installed artifact must never be observed half-written. The source
//! file may live on another filesystem (a temp directory, say), so a plain
//! rename is not enough. Instead the bytes are copied into a staging file
//! next to the destination, synced, and renamed over it.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::debug;

use crate::core::{PaperclipError, Result};

/// Atomically replace `dest` with the contents of `src`.
///
/// 1. Creates `dest`'s parent directory if needed
/// 2. Copies `src` into a uniquely named staging file in that directory
/// 3. Syncs the staging file to disk
/// 4. Renames the staging file over `dest`
///
/// Readers see either the old `dest` or the complete new one. If any step
/// fails the staging file is removed and `dest` is left as it was. The
/// permissions of an existing `dest` are kept; otherwise those of `src` are
/// used.
///
/// `src` is not modified.
///
/// # Examples
///
/// ```rust,no_run
/// use paperclip::utils::fs::atomic_replace;
/// use std::path::Path;
///
/// # fn example() -> paperclip::core::Result<()> {
/// atomic_replace(Path::new("/tmp/paper.jar.tmp"), Path::new("server.jar"))?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_replace(src: &Path, dest: &Path) -> Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PaperclipError::file_system("create directory", dir, e))?;

    // Removed on drop unless persisted
    let mut staged = tempfile::Builder::new()
        .prefix(".paperclip-")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(|e| PaperclipError::file_system("create staging file in", dir, e))?;
    debug!("Staging {} at {}", src.display(), staged.path().display());

    let mut reader = File::open(src).map_err(|e| PaperclipError::file_system("open", src, e))?;
    io::copy(&mut reader, staged.as_file_mut())
        .map_err(|e| PaperclipError::file_system("copy into", staged.path(), e))?;

    let permissions = fs::metadata(dest).or_else(|_| fs::metadata(src)).map(|m| m.permissions());
    if let Ok(permissions) = permissions {
        staged
            .as_file()
            .set_permissions(permissions)
            .map_err(|e| PaperclipError::file_system("set permissions on", staged.path(), e))?;
    }

    staged.as_file().sync_all().map_err(|e| PaperclipError::file_system("sync", staged.path(), e))?;

    staged.persist(dest).map_err(|e| PaperclipError::file_system("rename over", dest, e.error))?;

    debug!("Replaced {}", dest.display());
    Ok(())
}
