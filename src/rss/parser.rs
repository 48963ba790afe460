//! Feed parsing logic for RSS and Atom documents.

use anyhow::{anyhow, Result};
use feed_rs::parser;
use std::io::Cursor;
use tracing::debug;

use super::types::{FeedItem, NO_LINK, NO_SUMMARY, NO_TITLE};
use super::util::cleanup_xml;
use crate::TARGET_WEB_REQUEST;

/// Parse a feed document and return up to `limit` entries in document order.
///
/// Feeds typically list newest first, but whatever order the source provides
/// is kept; there is no re-sorting by date.
pub fn parse_feed_items(text: &str, limit: usize) -> Result<Vec<FeedItem>> {
    let reader = Cursor::new(text);
    match parser::parse(reader) {
        Ok(feed) => Ok(collect_items(feed, limit)),
        Err(first_err) => {
            // Try cleaning the XML first
            let cleaned = cleanup_xml(text);
            if cleaned.contains("<rss") || cleaned.contains("<feed") {
                let reader = Cursor::new(&cleaned);
                match parser::parse(reader) {
                    Ok(feed) => {
                        debug!(target: TARGET_WEB_REQUEST, "Feed parsed successfully after XML cleanup");
                        Ok(collect_items(feed, limit))
                    }
                    Err(second_err) => Err(anyhow!(
                        "Failed to parse feed even after cleanup. First error: {}. Second error: {}",
                        first_err,
                        second_err
                    )),
                }
            } else {
                Err(anyhow!("Content is not an RSS or Atom feed: {}", first_err))
            }
        }
    }
}

fn collect_items(feed: feed_rs::model::Feed, limit: usize) -> Vec<FeedItem> {
    feed.entries
        .into_iter()
        .take(limit)
        .map(item_from_entry)
        .collect()
}

fn item_from_entry(entry: feed_rs::model::Entry) -> FeedItem {
    let title = entry
        .title
        .map(|t| t.content)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let link = entry
        .links
        .first()
        .map(|link| link.href.clone())
        .unwrap_or_else(|| NO_LINK.to_string());

    // RSS <description> lands in the summary field; Atom entries without a
    // summary may still carry a content body.
    let summary = entry
        .summary
        .map(|t| t.content)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.and_then(|c| c.body))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NO_SUMMARY.to_string());

    FeedItem {
        title,
        link,
        summary,
    }
}
