//! Core types for paperclip
//!
//! Holds the error taxonomy shared by every component of the update workflow
//! and the helpers that turn those errors into terminal output.
//!
//! - [`PaperclipError`] - one variant per failure category
//! - [`ErrorContext`] - message plus optional details and suggestion
//! - [`user_friendly_error`] - convert any `anyhow::Error` for display

pub mod error;

pub use error::{ErrorContext, PaperclipError, Result, user_friendly_error};
