//! Drawing content fetch: HTTP against the configured backend, or local files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use viewport::FetchError;

use crate::config::HostConfig;
use crate::error::HostError;

/// Where a drawing comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

/// Resolve a user-supplied location.
///
/// Absolute `http(s)` URLs are used as given and `file://` URLs name local
/// files. Anything else is a local file if `exists` says so, otherwise a path
/// on the backend at `base_url` (the conversion service serves drawings as
/// `/uploads/...`).
pub fn resolve(base_url: &str, raw: &str, exists: impl Fn(&Path) -> bool) -> Source {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Source::Url(raw.to_string());
    }
    if let Some(path) = raw.strip_prefix("file://") {
        return Source::File(PathBuf::from(path));
    }
    if exists(Path::new(raw)) {
        return Source::File(PathBuf::from(raw));
    }
    let base = base_url.trim_end_matches('/');
    let path = raw.trim_start_matches('/');
    Source::Url(format!("{base}/{path}"))
}

pub fn build_client(config: &HostConfig) -> Result<reqwest::Client, HostError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeouts.request_secs))
        .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
        .build()
        .map_err(|e| HostError::HttpClientBuild(e.to_string()))
}

/// Fetch drawing text. Non-success HTTP statuses are errors; no retries.
pub async fn fetch_text(client: &reqwest::Client, source: &Source) -> Result<String, FetchError> {
    match source {
        Source::Url(url) => {
            tracing::debug!(%url, "fetching drawing");
            let transport = |e: reqwest::Error| FetchError::Transport { url: url.clone(), message: e.to_string() };
            let response = client.get(url).send().await.map_err(transport)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status { url: url.clone(), status: status.as_u16() });
            }
            response.text().await.map_err(transport)
        }
        Source::File(path) => {
            tracing::debug!(path = %path.display(), "reading drawing");
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| FetchError::Io { path: path.display().to_string(), message: e.to_string() })
        }
    }
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
