//! paperclip CLI entry point
//!
//! Parses the (argument-free) command line, runs one update and turns any
//! failure into a readable error plus a non-zero exit status.

use anyhow::Result;
use clap::Parser;
use paperclip::cli;
use paperclip::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
