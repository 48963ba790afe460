//! Main feed fetching functionality for feedlens.

use anyhow::{anyhow, Result};
use tracing::debug;

use super::client::fetch_document;
use super::parser::parse_feed_items;
use super::types::FeedItem;
use super::util::is_valid_url;
use crate::TARGET_WEB_REQUEST;

/// Fetch and parse a single feed, returning up to `limit` entries.
///
/// One request, no retry. Any failure — invalid URL, network, timeout,
/// non-success status, unparseable document — is an error naming the URL,
/// never a partial result.
pub async fn fetch_feed_items(
    client: &reqwest::Client,
    url: &str,
    limit: usize,
) -> Result<Vec<FeedItem>> {
    if url.trim().is_empty() {
        return Err(anyhow!("Feed URL is empty"));
    }
    if !is_valid_url(url) {
        return Err(anyhow!("Invalid feed URL: {}", url));
    }

    let body = fetch_document(client, url).await?;
    let items = parse_feed_items(&body, limit)
        .map_err(|err| anyhow!("Failed to parse feed from {}: {}", url, err))?;

    debug!(target: TARGET_WEB_REQUEST, "Parsed {} entries from {}", items.len(), url);
    Ok(items)
}
