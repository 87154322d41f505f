//! Error handling for paperclip
//!
//! Every failure the update workflow can hit is a variant of [`PaperclipError`].
//! The enum is the library's only error type; the binary wraps it in
//! [`anyhow::Error`] and turns it into an [`ErrorContext`] before printing.
//!
//! # Error Categories
//!
//! - **Network**: [`PaperclipError::Network`] for transport failures and
//!   non-success HTTP statuses on both the index and the download request
//! - **Remote data**: [`PaperclipError::MalformedResponse`],
//!   [`PaperclipError::VersionNotFound`], [`PaperclipError::NoCompatibleBuild`]
//! - **Integrity**: [`PaperclipError::ChecksumMismatch`]
//! - **Local files**: [`PaperclipError::FileSystem`]
//! - **Startup**: [`PaperclipError::Config`]
//!
//! None of these are retried. The workflow stops on the first one it sees.
//!
//! # Examples
//!
//! ```rust,no_run
//! use paperclip::core::{PaperclipError, user_friendly_error};
//!
//! let err = PaperclipError::VersionNotFound { version: "1.99.9".to_string() };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display(); // red "error:" line plus a green suggestion
//! ```

use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The error type for all paperclip operations.
#[derive(Error, Debug)]
pub enum PaperclipError {
    /// An HTTP request failed before or after reaching the server.
    ///
    /// Covers DNS, connection and TLS failures as well as responses whose
    /// status is not 2xx. `status` and `status_text` are only set in the
    /// latter case.
    #[error("Network error: GET {url} failed: {reason}")]
    Network {
        /// The URL that was requested
        url: String,
        /// HTTP status code, when a response was received
        status: Option<u16>,
        /// Reason phrase for `status` (e.g. "Not Found")
        status_text: Option<String>,
        /// Human-readable description of the failure
        reason: String,
    },

    /// The build index could not be understood.
    ///
    /// Raised when the body is not JSON, lacks the `versions` list, or a
    /// build record is structurally incomplete (for example a missing or
    /// badly formed `sha256`).
    #[error("Malformed build index from {url}: {reason}")]
    MalformedResponse {
        /// The index URL the body came from
        url: String,
        /// What was wrong with the body
        reason: String,
    },

    /// The configured version is not in the index's known-version list.
    #[error("Version '{version}' not found in the build index")]
    VersionNotFound {
        /// The `major.minor` version string that was looked up
        version: String,
    },

    /// The version is known but no build was published for it.
    #[error("No compatible builds found for version '{version}'")]
    NoCompatibleBuild {
        /// The `major.minor` version string that was looked up
        version: String,
    },

    /// A downloaded artifact did not hash to the expected digest.
    #[error("Checksum verification failed for {}", path.display())]
    ChecksumMismatch {
        /// The file that was verified
        path: PathBuf,
        /// Digest published by the build index
        expected: String,
        /// Digest computed locally, when the file could be read
        actual: Option<String>,
    },

    /// A local file could not be opened, read, written, renamed or removed.
    #[error("File system error: {operation} {}", path.display())]
    FileSystem {
        /// The operation that failed (e.g. "write", "rename")
        operation: String,
        /// The path the operation was applied to
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is missing or invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl PaperclipError {
    /// Build a [`PaperclipError::FileSystem`] for `operation` on `path`.
    pub fn file_system(
        operation: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`PaperclipError::Network`] from a transport-level failure.
    pub fn transport(url: impl Into<String>, err: &reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            status: err.status().map(|s| s.as_u16()),
            status_text: None,
            reason: err.to_string(),
        }
    }

    /// Build a [`PaperclipError::Network`] from a non-success response status.
    pub fn http_status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        let status_text = status.canonical_reason().map(str::to_string);
        Self::Network {
            url: url.into(),
            status: Some(status.as_u16()),
            reason: format!(
                "HTTP {}{}",
                status.as_u16(),
                status_text.as_deref().map(|t| format!(" {t}")).unwrap_or_default()
            ),
            status_text,
        }
    }

    /// Build a [`PaperclipError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error comes from a network request.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Convenience alias used across the library.
pub type Result<T, E = PaperclipError> = std::result::Result<T, E>;

/// Error wrapper with optional details and suggestion for CLI display.
///
/// Built by [`user_friendly_error`] from any error reaching `main`.
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error message
    pub message: String,
    /// Optional additional details about the error
    pub details: Option<String>,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
}

impl ErrorContext {
    /// Create a context carrying only `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for the terminal.
///
/// Recognises [`PaperclipError`] anywhere in the `anyhow` chain and attaches
/// a suggestion tailored to the variant. Other errors are shown with their
/// full context chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let Some(err) = error.chain().find_map(|e| e.downcast_ref::<PaperclipError>()) else {
        return ErrorContext::new(format!("{error:#}"));
    };

    let ctx = ErrorContext::new(format!("{error:#}"));
    match err {
        PaperclipError::Network {
            status: Some(404), ..
        } => ctx.with_suggestion(
            "The build API does not know this resource; check minecraftVersion in the config",
        ),
        PaperclipError::Network {
            status,
            status_text,
            ..
        } => {
            let ctx = ctx.with_suggestion("Check your network connection and the apiBaseUrl setting");
            match (status, status_text) {
                (Some(code), Some(text)) => ctx.with_details(format!("Status: {code}, Message: {text}")),
                (Some(code), None) => ctx.with_details(format!("Status: {code}")),
                _ => ctx,
            }
        }
        PaperclipError::MalformedResponse { .. } => ctx
            .with_details("The build API returned a document paperclip does not understand")
            .with_suggestion("Verify apiBaseUrl points at a Paper v2 build API"),
        PaperclipError::VersionNotFound { version } => ctx.with_suggestion(format!(
            "Set minecraftVersion to a version listed by the build API (got {version})"
        )),
        PaperclipError::NoCompatibleBuild { .. } => ctx
            .with_details("The version is known but has no published builds yet")
            .with_suggestion("Try again later or pick an older minor version"),
        PaperclipError::ChecksumMismatch {
            expected, actual, ..
        } => ctx
            .with_details(format!(
                "Expected: {expected}\nActual:   {}",
                actual.as_deref().unwrap_or("(unreadable)")
            ))
            .with_suggestion("The download was discarded and the installed jar left untouched; re-run to retry"),
        PaperclipError::FileSystem { source, .. } => {
            let ctx = ctx.with_details(source.to_string());
            if source.kind() == std::io::ErrorKind::PermissionDenied {
                ctx.with_suggestion("Check write permissions for serverFile and tempFile")
            } else {
                ctx
            }
        }
        PaperclipError::Config { .. } => ctx.with_suggestion(
            "Check paperclip_config.json (or the file named by PAPERCLIP_CONFIG)",
        ),
    }
}
