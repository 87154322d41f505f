//! Shared HTTP plumbing for the index client and the downloader.
//!
//! Both components issue plain unauthenticated `GET`s and classify failures
//! the same way: transport problems and non-2xx statuses become
//! [`PaperclipError::Network`]. The helpers here keep that classification and
//! the request logging in one place.

use reqwest::{Client, Response};
use tracing::{debug, error};

use crate::constants::user_agent;
use crate::core::{PaperclipError, Result};

/// Build the HTTP client used for a run.
///
/// Only the user agent is customised. Timeouts and connection handling are
/// left at the transport defaults.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(user_agent())
        .build()
        .map_err(|e| PaperclipError::Network {
            url: String::new(),
            status: None,
            status_text: None,
            reason: format!("Failed to build HTTP client: {e}"),
        })
}

/// Send a `GET` to `url` and return the response if its status is 2xx.
///
/// # Errors
///
/// [`PaperclipError::Network`] when the request cannot be sent or the
/// server answers with a non-success status. The status code and reason
/// phrase are logged and kept on the error.
pub async fn get_checked(client: &Client, url: &str) -> Result<Response> {
    debug!("HTTPS GET: {}", url);

    let response = client.get(url).send().await.map_err(|e| {
        error!("HTTPS error > URL: {}, Message: {}", url, e);
        PaperclipError::transport(url, &e)
    })?;

    let status = response.status();
    if !status.is_success() {
        error!(
            "HTTPS error > URL: {}, Status: {}, Message: {}",
            url,
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        return Err(PaperclipError::http_status(url, status));
    }

    Ok(response)
}
