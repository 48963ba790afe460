use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;
use tracing::info;

use crate::llm::ModelId;
use crate::LLMClient;

/// Feeds used when FEED_URLS is not set.
pub const DEFAULT_FEED_URLS: [&str; 4] = [
    "https://rss.arxiv.org/rss/cs.AI/",
    "https://simonwillison.net/atom/everything/",
    "https://news.mit.edu/topic/mitartificial-intelligence2-rss.xml",
    "https://generative-ai-newsroom.com/feed",
];

/// Startup configuration, read once from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub feed_urls: Vec<String>,
    pub item_limit: usize,
    pub default_prompt: String,
    pub default_model: ModelId,
    pub temperature: f32,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // A missing or blank prompt file is fatal at startup.
        let prompt_path = env::var("PROMPT_FILE").unwrap_or_else(|_| "prompt.txt".to_string());
        let default_prompt = fs::read_to_string(&prompt_path)
            .with_context(|| format!("Failed to read default prompt file: {}", prompt_path))?;
        if default_prompt.trim().is_empty() {
            return Err(anyhow!("Default prompt file {} is empty", prompt_path));
        }

        let feed_urls = match env::var("FEED_URLS") {
            Ok(value) if !value.trim().is_empty() => value
                .lines()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect(),
            _ => DEFAULT_FEED_URLS.iter().map(|s| s.to_string()).collect(),
        };

        let item_limit = env::var("FEED_ITEM_LIMIT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(5);

        let default_model = env::var("DEFAULT_MODEL")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();

        let temperature: f32 = env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(0.0);

        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8080);

        Ok(Config {
            feed_urls,
            item_limit,
            default_prompt,
            default_model,
            temperature,
            port,
        })
    }
}

/// Build the model client selected by LLM_BACKEND.
///
/// The hosted API is the default and requires OPENAI_API_KEY; without it
/// startup fails. The Ollama backend talks to a local daemon instead.
pub fn build_llm_client() -> Result<LLMClient> {
    match env::var("LLM_BACKEND").as_deref() {
        Ok("ollama") => {
            let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost".to_string());
            let port: u16 = env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434);

            info!("Connecting to Ollama at {}:{}", host, port);
            Ok(LLMClient::Ollama(Ollama::new(host, port)))
        }
        _ => {
            let api_key = env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("OPENAI_API_KEY environment variable required"))?;
            let config = OpenAIConfig::new().with_api_key(api_key);
            Ok(LLMClient::OpenAI(OpenAIClient::with_config(config)))
        }
    }
}
