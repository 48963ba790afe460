use std::sync::Arc;

use anyhow::Result;

use feedlens::app::{self, AppState};
use feedlens::config::{build_llm_client, Config};
use feedlens::llm::LlmDispatcher;
use feedlens::logging::configure_logging;
use feedlens::rss::create_http_client;
use feedlens::LLMParams;

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    // Missing credential or prompt file is fatal here; nothing recovers it.
    let config = Config::from_env()?;
    let llm_client = build_llm_client()?;

    let dispatcher = LlmDispatcher::new(LLMParams {
        llm_client,
        temperature: config.temperature,
    });
    let http_client = create_http_client()?;

    let state = AppState::new(&config, http_client, Arc::new(dispatcher));
    app::serve(&config, state).await
}
