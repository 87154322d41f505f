//! paperclip keeps a Paper server jar on the newest build of a configured
//! version.
//!
//! A run asks the build API for the version group's index, picks the highest
//! build of the target version, and compares its published SHA-256 with the
//! installed jar. When they differ it streams the new jar to a temp file,
//! verifies it, and atomically swaps it in.
//!
//! # Modules
//!
//! - [`config`] - JSON configuration loading and validation
//! - [`index`] - build index client and build selection
//! - [`download`] - streaming artifact downloader
//! - [`verification`] - SHA-256 file verification
//! - [`workflow`] - the update state machine tying the above together
//! - [`core`] - error types
//! - [`cli`] - the binary's entry point
//!
//! # Example
//!
//! ```rust,no_run
//! use paperclip::config::UpdaterConfig;
//! use paperclip::workflow::UpdateWorkflow;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = UpdaterConfig::load_from(Path::new("paperclip_config.json")).await?;
//! let report = UpdateWorkflow::new(config)?.run().await?;
//! println!("{:?} build {}", report.outcome, report.build.build_number());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod download;
pub mod index;
pub mod utils;
pub mod verification;
pub mod workflow;
