//! Type definitions for the feed module.

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// One entry extracted from an RSS or Atom document.
///
/// Immutable once fetched; items are kept in document order and never
/// deduplicated across feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub summary: String,
}

// Placeholders for entries missing a field.
pub const NO_TITLE: &str = "No Title";
pub const NO_SUMMARY: &str = "No Summary Available";
pub const NO_LINK: &str = "#";

// Constants
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
