//! Download progress display.
//!
//! A byte-count bar is drawn on stderr while the artifact downloads. It is
//! hidden when stderr is not a terminal or when `PAPERCLIP_NO_PROGRESS` is
//! set, so logs from cron jobs and CI stay clean.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

use crate::constants::NO_PROGRESS_ENV;

/// Whether progress bars should be suppressed.
fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some() || !std::io::stderr().is_terminal()
}

/// Style for byte transfers.
///
/// ```text
/// downloading [━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━] 41.2 MiB/41.2 MiB (00:00)
/// ```
fn download_style(known_length: bool) -> ProgressStyle {
    let template = if known_length {
        "{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})"
    } else {
        "{prefix:.bold.cyan} {spinner} {bytes} ({bytes_per_sec})"
    };
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸━")
}

/// Create a progress bar for a download of `content_length` bytes, if known.
#[must_use]
pub fn download_bar(content_length: Option<u64>) -> ProgressBar {
    if is_progress_disabled() {
        return ProgressBar::hidden();
    }

    let bar = match content_length {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    bar.set_style(download_style(content_length.is_some()));
    bar.set_prefix("downloading");
    bar
}
