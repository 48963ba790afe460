//! The two user actions, run as commands against the session.
//!
//! Each command runs to completion (or fails) before the presentation layer
//! reflects new state. Both network loops are strictly sequential, one call
//! at a time; nothing is retried and nothing is cancellable mid-batch.

use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::llm::ModelService;
use crate::rss::{fetch_feed_items, FeedItem};
use crate::session::{ProcessedResult, Session};
use crate::{TARGET_LLM_REQUEST, TARGET_WEB_REQUEST};

/// Outcome of a fetch command, rendered by the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub fetched: usize,
    pub errors: Vec<String>,
    pub message: String,
}

/// Outcome of a process command.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub processed: usize,
    pub total: usize,
    pub error: Option<String>,
    pub message: String,
}

/// Split the session's URL text into one trimmed URL per non-blank line.
pub fn feed_urls(session: &Session) -> Vec<String> {
    session
        .feed_urls_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// The content string sent to the model for one item.
pub fn item_content(item: &FeedItem) -> String {
    format!("Title: {}. Summary: {}", item.title, item.summary)
}

/// Fetch every configured feed sequentially and replace the session's items.
///
/// Per-URL failures are recovered locally: the failing feed contributes zero
/// items and one error message, and the loop continues with the rest.
pub async fn fetch_feeds(
    session: &mut Session,
    client: &reqwest::Client,
    limit: usize,
) -> FetchOutcome {
    // Prior results no longer correspond to anything once a fetch starts.
    session.fetched_items.clear();
    session.llm_outputs.clear();

    let urls = feed_urls(session);
    if urls.is_empty() {
        return FetchOutcome {
            fetched: 0,
            errors: Vec::new(),
            message: "Please enter at least one feed URL.".to_string(),
        };
    }

    let mut all_items = Vec::new();
    let mut errors = Vec::new();
    for url in &urls {
        info!(target: TARGET_WEB_REQUEST, "Fetching from: {}", url);
        match fetch_feed_items(client, url, limit).await {
            Ok(items) if !items.is_empty() => all_items.extend(items),
            Ok(_) => {
                warn!(target: TARGET_WEB_REQUEST, "No entries found at {}", url);
                errors.push(format!("Could not retrieve items from {}", url));
            }
            Err(err) => {
                error!(target: TARGET_WEB_REQUEST, "Error fetching feed from {}: {}", url, err);
                errors.push(format!("Error fetching feed from {}: {}", url, err));
            }
        }
    }

    session.fetched_items = all_items;
    let fetched = session.fetched_items.len();
    let message = if fetched > 0 {
        format!(
            "Successfully fetched {} items from the provided feeds.",
            fetched
        )
    } else {
        "No items were fetched. Check the URLs and try again.".to_string()
    };

    FetchOutcome {
        fetched,
        errors,
        message,
    }
}

/// Send every fetched item through the model sequentially.
///
/// Guarded by "at least one fetched item" and "prompt non-empty"; guard
/// failures block the action before any model call. A mid-batch model
/// failure aborts the remaining items; results accumulated so far stay in
/// the session.
pub async fn process_items(
    session: &mut Session,
    service: &dyn ModelService,
    progress: &watch::Sender<f32>,
) -> ProcessOutcome {
    if session.fetched_items.is_empty() {
        return ProcessOutcome {
            processed: 0,
            total: 0,
            error: None,
            message: "Fetch some feed items first before processing.".to_string(),
        };
    }
    if session.prompt_text.trim().is_empty() {
        return ProcessOutcome {
            processed: 0,
            total: session.fetched_items.len(),
            error: None,
            message: "Prompt cannot be empty.".to_string(),
        };
    }

    session.llm_outputs.clear();
    let _ = progress.send(0.0);

    let total = session.fetched_items.len();
    let model = session.selected_model;
    for (i, item) in session.fetched_items.iter().enumerate() {
        let content = item_content(item);
        info!(
            target: TARGET_LLM_REQUEST,
            "Processing item {}/{}: {:.50}", i + 1, total, item.title
        );

        match service.generate(model, &session.prompt_text, &content).await {
            Ok(output) => {
                session.llm_outputs.push(ProcessedResult {
                    title: item.title.clone(),
                    link: item.link.clone(),
                    original_content: content,
                    llm_output: output,
                });
                let _ = progress.send((i + 1) as f32 / total as f32);
            }
            Err(err) => {
                error!(
                    target: TARGET_LLM_REQUEST,
                    "Model call failed on item {}/{}, aborting batch: {}", i + 1, total, err
                );
                let processed = session.llm_outputs.len();
                return ProcessOutcome {
                    processed,
                    total,
                    error: Some(err.to_string()),
                    message: format!(
                        "Processing aborted after {} of {} items: {}",
                        processed, total, err
                    ),
                };
            }
        }
    }

    let processed = session.llm_outputs.len();
    ProcessOutcome {
        processed,
        total,
        error: None,
        message: format!("All {} items processed!", processed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::ModelId;
    use crate::rss::create_http_client;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records every generate call; optionally fails from call N on.
    struct RecordingService {
        calls: Mutex<Vec<(ModelId, String, String)>>,
        fail_from: Option<usize>,
    }

    impl RecordingService {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_from: None,
            }
        }

        fn failing_from(call: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_from: Some(call),
            }
        }

        fn calls(&self) -> Vec<(ModelId, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelService for RecordingService {
        async fn generate(
            &self,
            model: ModelId,
            instructions: &str,
            input: &str,
        ) -> anyhow::Result<String> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push((model, instructions.to_string(), input.to_string()));
            if self.fail_from.is_some_and(|n| index >= n) {
                return Err(anyhow!("model service unavailable"));
            }
            Ok(format!("output for: {}", input))
        }
    }

    fn session_with_items(items: Vec<FeedItem>) -> Session {
        let config = Config {
            feed_urls: Vec::new(),
            item_limit: 5,
            default_prompt: "Summarize in one sentence.".to_string(),
            default_model: ModelId::default(),
            temperature: 0.0,
            port: 8080,
        };
        let mut session = Session::new(&config);
        session.fetched_items = items;
        session
    }

    fn item(title: &str, summary: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: format!("https://example.com/{}", title),
            summary: summary.to_string(),
        }
    }

    fn rss_body(count: usize) -> String {
        let items: String = (0..count)
            .map(|i| {
                format!(
                    "<item><title>Item {i}</title><link>https://example.com/{i}</link><description>Summary {i}</description></item>"
                )
            })
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss version=\"2.0\"><channel><title>Feed</title><link>https://example.com</link><description>d</description>{items}</channel></rss>"
        )
    }

    #[test]
    fn urls_split_on_lines_skipping_blanks() {
        let mut session = session_with_items(Vec::new());
        session.feed_urls_text =
            "https://a.example/feed\n\n  https://b.example/feed  \n".to_string();
        assert_eq!(
            feed_urls(&session),
            vec!["https://a.example/feed", "https://b.example/feed"]
        );
    }

    #[test]
    fn content_follows_the_title_summary_template() {
        let content = item_content(&item("X", "Y"));
        assert_eq!(content, "Title: X. Summary: Y");
    }

    #[tokio::test]
    async fn fetch_replaces_items_and_clears_outputs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(rss_body(5), "application/rss+xml"))
            .mount(&server)
            .await;

        let mut session = session_with_items(vec![item("stale", "stale")]);
        session.llm_outputs.push(ProcessedResult {
            title: "stale".to_string(),
            link: "#".to_string(),
            original_content: "stale".to_string(),
            llm_output: "stale".to_string(),
        });
        session.feed_urls_text = format!("{}/feed", server.uri());

        let client = create_http_client().unwrap();
        let outcome = fetch_feeds(&mut session, &client, 5).await;

        assert_eq!(outcome.fetched, 5);
        assert!(outcome.errors.is_empty());
        assert_eq!(session.fetched_items.len(), 5);
        assert_eq!(session.fetched_items[0].title, "Item 0");
        assert!(session.llm_outputs.is_empty());
    }

    #[tokio::test]
    async fn failing_feed_contributes_errors_not_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/good"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(rss_body(3), "application/rss+xml"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut session = session_with_items(Vec::new());
        session.feed_urls_text = format!("{0}/good\n{0}/bad", server.uri());

        let client = create_http_client().unwrap();
        let outcome = fetch_feeds(&mut session, &client, 5).await;

        assert_eq!(outcome.fetched, 3);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("/bad"));
        assert_eq!(session.fetched_items.len(), 3);
    }

    #[tokio::test]
    async fn fetch_without_urls_is_blocked_with_a_message() {
        let mut session = session_with_items(Vec::new());
        session.feed_urls_text = "\n  \n".to_string();

        let client = create_http_client().unwrap();
        let outcome = fetch_feeds(&mut session, &client, 5).await;

        assert_eq!(outcome.fetched, 0);
        assert!(outcome.message.contains("at least one feed URL"));
    }

    #[tokio::test]
    async fn fetch_with_no_items_anywhere_reports_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut session = session_with_items(Vec::new());
        session.feed_urls_text = format!("{}/bad", server.uri());

        let client = create_http_client().unwrap();
        let outcome = fetch_feeds(&mut session, &client, 5).await;

        assert_eq!(outcome.fetched, 0);
        assert!(outcome.message.contains("No items were fetched"));
    }

    #[tokio::test]
    async fn processing_maps_items_one_to_one_in_order() {
        let mut session = session_with_items(vec![item("X", "Y"), item("A", "B")]);
        let service = RecordingService::new();
        let (tx, rx) = watch::channel(0.0f32);

        let outcome = process_items(&mut session, &service, &tx).await;

        assert_eq!(outcome.processed, 2);
        assert!(outcome.error.is_none());
        assert_eq!(session.llm_outputs.len(), session.fetched_items.len());
        assert_eq!(session.llm_outputs[0].original_content, "Title: X. Summary: Y");
        assert_eq!(
            session.llm_outputs[0].llm_output,
            "output for: Title: X. Summary: Y"
        );
        assert_eq!(session.llm_outputs[1].title, "A");
        assert_eq!(*rx.borrow(), 1.0);

        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, ModelId::Gpt4o);
        assert_eq!(calls[0].1, "Summarize in one sentence.");
        assert_eq!(calls[0].2, "Title: X. Summary: Y");
    }

    #[tokio::test]
    async fn empty_prompt_blocks_processing_before_any_call() {
        let mut session = session_with_items(vec![item("X", "Y")]);
        session.prompt_text = "   \n ".to_string();
        let service = RecordingService::new();
        let (tx, _rx) = watch::channel(0.0f32);

        let outcome = process_items(&mut session, &service, &tx).await;

        assert_eq!(outcome.processed, 0);
        assert!(outcome.message.contains("Prompt cannot be empty"));
        assert!(service.calls().is_empty());
        assert!(session.llm_outputs.is_empty());
    }

    #[tokio::test]
    async fn zero_items_blocks_processing_with_a_message() {
        let mut session = session_with_items(Vec::new());
        let service = RecordingService::new();
        let (tx, _rx) = watch::channel(0.0f32);

        let outcome = process_items(&mut session, &service, &tx).await;

        assert_eq!(outcome.processed, 0);
        assert!(outcome.message.contains("Fetch some feed items first"));
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn mid_batch_failure_keeps_earlier_results() {
        let mut session =
            session_with_items(vec![item("one", "1"), item("two", "2"), item("three", "3")]);
        let service = RecordingService::failing_from(1);
        let (tx, _rx) = watch::channel(0.0f32);

        let outcome = process_items(&mut session, &service, &tx).await;

        assert_eq!(outcome.processed, 1);
        assert_eq!(outcome.total, 3);
        assert!(outcome.error.is_some());
        assert_eq!(session.llm_outputs.len(), 1);
        assert_eq!(session.llm_outputs[0].title, "one");
        // The batch stops at the failure: two calls made, the third never is.
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn reprocessing_replaces_previous_outputs() {
        let mut session = session_with_items(vec![item("X", "Y")]);
        let service = RecordingService::new();
        let (tx, _rx) = watch::channel(0.0f32);

        process_items(&mut session, &service, &tx).await;
        assert_eq!(session.llm_outputs.len(), 1);

        process_items(&mut session, &service, &tx).await;
        assert_eq!(session.llm_outputs.len(), 1);
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn progress_advances_per_item() {
        let mut session = session_with_items(vec![
            item("a", "1"),
            item("b", "2"),
            item("c", "3"),
            item("d", "4"),
        ]);
        let service = RecordingService::new();
        let (tx, rx) = watch::channel(0.0f32);

        let outcome = process_items(&mut session, &service, &tx).await;

        assert_eq!(outcome.processed, 4);
        assert_eq!(*rx.borrow(), 1.0);
    }
}
