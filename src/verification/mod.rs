//! SHA-256 verification of local files.
//!
//! The build index publishes a hex SHA-256 for every artifact. Before the
//! workflow downloads anything it checks whether the installed file already
//! hashes to that value, and after downloading it checks the temp file the
//! same way.
//!
//! A missing file is not an error here: it simply does not match. Only a
//! file that exists but cannot be read produces
//! [`PaperclipError::FileSystem`].

use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::constants::IO_BUFFER_SIZE;
use crate::core::{PaperclipError, Result};

/// Length of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

/// Result of comparing a file against an expected digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestCheck {
    /// The file does not exist.
    Missing,
    /// The file hashes to the expected digest.
    Match,
    /// The file exists but hashes to something else.
    Mismatch {
        /// The digest that was computed
        actual: String,
    },
}

impl DigestCheck {
    /// Whether the file matched.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Computes and compares SHA-256 digests of files.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Compute the lowercase hex SHA-256 of the file at `file_path`.
    ///
    /// The file is streamed in fixed-size chunks, so artifacts of any size
    /// hash in constant memory.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use paperclip::verification::ChecksumVerifier;
    /// use std::path::Path;
    ///
    /// # async fn example() -> paperclip::core::Result<()> {
    /// let digest = ChecksumVerifier::compute_sha256(Path::new("server.jar")).await?;
    /// println!("SHA256: {digest}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn compute_sha256(file_path: &Path) -> Result<String> {
        debug!("Computing SHA256 checksum for: {}", file_path.display());

        let mut file = fs::File::open(file_path)
            .await
            .map_err(|e| PaperclipError::file_system("open", file_path, e))?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; IO_BUFFER_SIZE];
        loop {
            let read = file
                .read(&mut buffer)
                .await
                .map_err(|e| PaperclipError::file_system("read", file_path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(hex::encode(hasher.finalize()))
    }

    /// Compare `file_path` against `expected_digest`.
    ///
    /// Existence is checked separately from reading so that a missing file
    /// is reported as [`DigestCheck::Missing`] while an unreadable one is an
    /// error. The comparison ignores hex case.
    pub async fn check(file_path: &Path, expected_digest: &str) -> Result<DigestCheck> {
        let exists = fs::try_exists(file_path)
            .await
            .map_err(|e| PaperclipError::file_system("stat", file_path, e))?;
        if !exists {
            debug!("{} does not exist, nothing to verify", file_path.display());
            return Ok(DigestCheck::Missing);
        }

        let actual = Self::compute_sha256(file_path).await?;
        if actual.eq_ignore_ascii_case(expected_digest.trim()) {
            Ok(DigestCheck::Match)
        } else {
            debug!(
                "Digest mismatch for {}: expected {}, actual {}",
                file_path.display(),
                expected_digest,
                actual
            );
            Ok(DigestCheck::Mismatch {
                actual,
            })
        }
    }

    /// Whether `file_path` exists and hashes to `expected_digest`.
    ///
    /// Returns `Ok(false)` for a missing file.
    pub async fn verify(file_path: &Path, expected_digest: &str) -> Result<bool> {
        Ok(Self::check(file_path, expected_digest).await?.is_match())
    }

    /// Validate a hex SHA-256 string and normalise it to lowercase.
    ///
    /// Returns `None` unless `digest` is exactly 64 hex characters.
    #[must_use]
    pub fn normalize_sha256(digest: &str) -> Option<String> {
        let digest = digest.trim();
        if digest.len() == SHA256_HEX_LEN && digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(digest.to_ascii_lowercase())
        } else {
            None
        }
    }
}
