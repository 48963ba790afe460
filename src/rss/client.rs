//! HTTP client creation and request handling for feeds.

use anyhow::{anyhow, Context, Result};
use reqwest::header;
use tokio::time::timeout;
use tracing::debug;

use super::types::REQUEST_TIMEOUT;
use crate::TARGET_WEB_REQUEST;

/// Create the shared client used for all feed requests.
pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Fetch the raw feed document at `url`.
///
/// Any network failure, timeout, or non-success status is an error naming
/// the URL. No retry.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(target: TARGET_WEB_REQUEST, "Loading feed from {}", url);

    let response = timeout(
        REQUEST_TIMEOUT,
        client
            .get(url)
            .header(header::USER_AGENT, "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .header(header::ACCEPT, "application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9")
            .send(),
    )
    .await
    .map_err(|_| {
        anyhow!(
            "Request to {} timed out after {} seconds",
            url,
            REQUEST_TIMEOUT.as_secs()
        )
    })?
    .with_context(|| format!("Request to {} failed", url))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Non-success status {} from {}",
            response.status(),
            url
        ));
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from {}", url))
}
