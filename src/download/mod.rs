//! Artifact downloader.
//!
//! Streams a build's server jar to a local path chunk by chunk, so memory
//! use does not grow with the artifact size. The downloader performs no
//! integrity check: a returned `Ok` only means the body was received and
//! written in full. The caller verifies the digest afterwards.

use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::{PaperclipError, Result};
use crate::utils::http::get_checked;
use crate::utils::progress::download_bar;

/// Downloads build artifacts over HTTP.
pub struct ArtifactDownloader {
    client: Client,
}

impl ArtifactDownloader {
    /// Create a downloader sharing `client`'s connection pool.
    pub fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    /// Stream `url` into `destination`, replacing anything already there.
    ///
    /// The destination is only created once the server has answered with a
    /// success status, so a failed request leaves no file behind. The file
    /// is flushed and synced before returning.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`PaperclipError::Network`] on transport failure, a non-2xx status,
    ///   an interrupted body, or a body shorter than its `Content-Length`
    /// - [`PaperclipError::FileSystem`] if the destination cannot be created
    ///   or written
    pub async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let response = get_checked(&self.client, url).await?;
        let content_length = response.content_length();
        debug!("Content-Length for {}: {:?}", url, content_length);

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PaperclipError::file_system("create directory", parent, e))?;
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| PaperclipError::file_system("create", destination, e))?;

        let bar = download_bar(content_length);
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                bar.abandon();
                PaperclipError::transport(url, &e)
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|e| PaperclipError::file_system("write", destination, e))?;
            written += chunk.len() as u64;
            bar.inc(chunk.len() as u64);
        }
        bar.finish_and_clear();

        file.flush().await.map_err(|e| PaperclipError::file_system("flush", destination, e))?;
        file.sync_all().await.map_err(|e| PaperclipError::file_system("sync", destination, e))?;
        drop(file);

        if let Some(expected) = content_length
            && written != expected
        {
            return Err(PaperclipError::Network {
                url: url.to_string(),
                status: None,
                status_text: None,
                reason: format!("body ended after {written} of {expected} bytes"),
            });
        }

        info!("Downloaded {} bytes to {}", written, destination.display());
        Ok(written)
    }
}
