//! Configuration loading for paperclip.
//!
//! The updater reads one JSON document at startup (see [`UpdaterConfig`]).
//! Its location is resolved by [`config_path`]:
//!
//! 1. `PAPERCLIP_CONFIG` environment variable (if set and non-empty)
//! 2. `paperclip_config.json` in the current working directory
//!
//! A missing or malformed file is fatal before any network request is made.

mod updater;

pub use updater::{TargetVersion, UpdaterConfig};

use crate::constants::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
use crate::core::Result;
use std::path::PathBuf;

/// Resolve the configuration file location.
#[must_use]
pub fn config_path() -> PathBuf {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Load the configuration from [`config_path`].
pub async fn load() -> Result<UpdaterConfig> {
    UpdaterConfig::load_from(&config_path()).await
}
