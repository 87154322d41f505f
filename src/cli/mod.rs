//! Command-line interface for paperclip.
//!
//! The binary has a single entry point and no flags beyond `--help` and
//! `--version`. Everything it needs comes from the configuration file
//! (located via `PAPERCLIP_CONFIG` or `./paperclip_config.json`) and the
//! environment:
//!
//! | Variable                | Effect                                      |
//! |-------------------------|---------------------------------------------|
//! | `PAPERCLIP_CONFIG`      | Path of the JSON configuration file         |
//! | `RUST_LOG`              | Log filter (default `paperclip=info`)       |
//! | `PAPERCLIP_NO_PROGRESS` | Hide the download progress bar              |
//!
//! # Output
//!
//! Status lines are logged to stderr as the run progresses. The final
//! outcome goes to stdout:
//!
//! ```text
//! Paperclip finished successfully (1.284s)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::constants::DEFAULT_LOG_FILTER;
use crate::workflow::{UpdateOutcome, UpdateWorkflow, WorkflowReport};

/// Keep a Paper server jar on the newest build of its configured version.
#[derive(Parser, Debug)]
#[command(
    name = "paperclip",
    version,
    about,
    long_about = "Checks the Paper build API for the newest build of the configured \
                  version, downloads it when the installed jar differs, verifies its \
                  SHA-256 and swaps it in atomically.\n\nConfiguration is read from \
                  ./paperclip_config.json or the file named by PAPERCLIP_CONFIG."
)]
pub struct Cli {}

impl Cli {
    /// Run one update and print the outcome.
    ///
    /// Logging is initialised here so that library users embedding the
    /// workflow keep control of their own subscriber.
    pub async fn execute(self) -> Result<()> {
        let started = Instant::now();
        init_logging();

        info!("paperclip v{}", env!("CARGO_PKG_VERSION"));
        info!("Loading config...");

        let config = config::load().await.with_context(|| {
            format!("Failed to load configuration from {}", config::config_path().display())
        })?;

        let report = UpdateWorkflow::new(config)?.run().await.context("Update failed")?;
        print_report(&report);

        println!(
            "{}",
            format!(
                "Paperclip finished successfully ({:.3}s)",
                started.elapsed().as_secs_f64()
            )
            .green()
            .bold()
        );
        Ok(())
    }
}

fn print_report(report: &WorkflowReport) {
    match report.outcome {
        UpdateOutcome::AlreadyCurrent => println!(
            "{} build {} is already installed (checked in {:.3}s)",
            "✓".green(),
            report.build.build_number(),
            report.elapsed.as_secs_f64()
        ),
        UpdateOutcome::Installed => println!(
            "{} installed build {} ({} bytes in {:.3}s)",
            "✓".green(),
            report.build.build_number(),
            report.bytes_downloaded,
            report.elapsed.as_secs_f64()
        ),
    }
}

/// Install the global tracing subscriber.
///
/// Honours `RUST_LOG` and falls back to `paperclip=info`. Lines are written
/// to stderr without targets so they read as plain status output. Calling
/// this more than once is harmless.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
