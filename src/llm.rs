use anyhow::{anyhow, Context, Result};
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

/// The three hosted models selectable from the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "gpt-4.1")]
    Gpt41,
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "o4-mini")]
    O4Mini,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [ModelId::Gpt41, ModelId::Gpt4o, ModelId::O4Mini];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt41 => "gpt-4.1",
            ModelId::Gpt4o => "gpt-4o",
            ModelId::O4Mini => "o4-mini",
        }
    }

    /// Reasoning models reject sampling options such as temperature.
    pub fn is_reasoning(&self) -> bool {
        matches!(self, ModelId::O4Mini)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "gpt-4.1" => Ok(ModelId::Gpt41),
            "gpt-4o" => Ok(ModelId::Gpt4o),
            "o4-mini" => Ok(ModelId::O4Mini),
            other => Err(anyhow!("Unknown model: {}", other)),
        }
    }
}

/// The model service boundary: (instructions, input) in, generated text out.
///
/// The command layer only sees this trait; `LlmDispatcher` is the live
/// implementation.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn generate(&self, model: ModelId, instructions: &str, input: &str) -> Result<String>;
}

/// Live dispatcher over the configured LLM client.
pub struct LlmDispatcher {
    params: LLMParams,
}

impl LlmDispatcher {
    pub fn new(params: LLMParams) -> Self {
        Self { params }
    }
}

#[async_trait]
impl ModelService for LlmDispatcher {
    // One request per call, no retry, no timeout override: a failure is the
    // caller's to handle.
    async fn generate(&self, model: ModelId, instructions: &str, input: &str) -> Result<String> {
        debug!(target: TARGET_LLM_REQUEST, "Sending request to {}", model);

        match &self.params.llm_client {
            LLMClient::Ollama(ollama) => {
                let mut request =
                    GenerationRequest::new(model.as_str().to_string(), input.to_string());
                request.system = Some(instructions.to_string().into());
                request.options =
                    Some(GenerationOptions::default().temperature(self.params.temperature));

                let response = ollama
                    .generate(request)
                    .await
                    .with_context(|| format!("Ollama request to {} failed", model))?;
                Ok(response.response)
            }
            LLMClient::OpenAI(client) => {
                let mut builder = CreateChatCompletionRequestArgs::default();
                builder.model(model.as_str()).messages(vec![
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(instructions)
                        .build()?
                        .into(),
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(input)
                        .build()?
                        .into(),
                ]);
                if !model.is_reasoning() {
                    builder.temperature(self.params.temperature);
                }
                let request = builder.build()?;

                let response = client
                    .chat()
                    .create(request)
                    .await
                    .with_context(|| format!("OpenAI request to {} failed", model))?;

                response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| anyhow!("Model {} returned no text", model))
            }
        }
    }
}
