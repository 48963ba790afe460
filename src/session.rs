//! Per-session mutable state.
//!
//! One session exists per running instance; it is built from startup
//! configuration and mutated only by the command layer. Nothing here
//! survives process exit.

use serde::Serialize;

use crate::config::Config;
use crate::llm::ModelId;
use crate::rss::FeedItem;

/// One item's trip through the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedResult {
    pub title: String,
    pub link: String,
    pub original_content: String,
    pub llm_output: String,
}

/// All mutable state for one interactive session.
///
/// When `llm_outputs` is non-empty it corresponds one-to-one and in-order
/// with the `fetched_items` present when processing last started; the fetch
/// command clears both lists before repopulating `fetched_items`.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub feed_urls_text: String,
    pub fetched_items: Vec<FeedItem>,
    pub llm_outputs: Vec<ProcessedResult>,
    pub selected_model: ModelId,
    pub prompt_text: String,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            feed_urls_text: config.feed_urls.join("\n"),
            fetched_items: Vec::new(),
            llm_outputs: Vec::new(),
            selected_model: config.default_model,
            prompt_text: config.default_prompt.clone(),
        }
    }
}
