//! Global constants used throughout the paperclip codebase.
//!
//! Endpoint defaults, file names and environment variable names live here so
//! the config loader, the CLI and the tests agree on them.

/// Root of the Paper v2 build API used when `apiBaseUrl` is not configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api.papermc.io/v2/projects/paper";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "paperclip_config.json";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "PAPERCLIP_CONFIG";

/// Environment variable that hides the download progress bar when set.
pub const NO_PROGRESS_ENV: &str = "PAPERCLIP_NO_PROGRESS";

/// Default tracing filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "paperclip=info";

/// Suffix appended to the install path to name the advisory run lock.
pub const LOCK_FILE_SUFFIX: &str = ".lock";

/// Buffer size for streaming file hashing and staged copies (64 KiB).
pub const IO_BUFFER_SIZE: usize = 64 * 1024;

/// User agent sent with every request.
pub fn user_agent() -> String {
    format!("paperclip/{}", env!("CARGO_PKG_VERSION"))
}
