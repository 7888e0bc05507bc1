use crate::config::LlmConfig;
use crate::llm::providers::{self, LlmProvider};
use crate::llm::ChatMessage;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Failure classes of a generative backend call.
///
/// Quota exhaustion is kept distinct so that callers can choose to surface it
/// instead of degrading.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("request error: {0}")]
    Request(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl LlmError {
    pub fn is_quota(&self) -> bool {
        matches!(self, LlmError::QuotaExceeded(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Request(e.to_string())
    }
}

/// Capability consumed by the router and the units.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Single-turn completion.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Multi-turn chat over an ordered list of turns.
    async fn chat(&self, turns: &[ChatMessage]) -> Result<String, LlmError>;
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(prompt).await
    }

    async fn chat(&self, turns: &[ChatMessage]) -> Result<String, LlmError> {
        (**self).chat(turns).await
    }
}

/// Generic LLM client that delegates work to a concrete provider.
#[derive(Debug)]
pub struct LlmClient {
    provider: Box<dyn LlmProvider>,
}

impl LlmClient {
    /// Creates a new LLM client for the configured provider and model.
    ///
    /// # Arguments
    /// * `config` - Provider name ("openai", "anthropic", "ollama" or "gemini"),
    ///   model, timeout and optional endpoint override
    ///
    /// # Returns
    /// * `Result<LlmClient, LlmError>` - New LLM client instance or error
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = providers::http_client(config.timeout_secs)?;
        let endpoint = config.endpoint.clone();
        let model = config.model.as_str();

        let provider: Box<dyn LlmProvider> = match config.provider.as_str() {
            "openai" => Box::new(providers::openai::OpenAiProvider::new(model, endpoint, http)?),
            "anthropic" => Box::new(providers::anthropic::AnthropicProvider::new(
                model, endpoint, http,
            )?),
            "ollama" => Box::new(providers::ollama::OllamaProvider::new(model, endpoint, http)),
            "gemini" => Box::new(providers::gemini::GeminiProvider::new(model, endpoint, http)?),
            other => return Err(LlmError::Config(format!("Unknown provider '{}'", other))),
        };

        Ok(LlmClient { provider })
    }

    /// Sends the messages to the provider and returns the raw response.
    pub async fn call_llm_api(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        debug!("messages: {:?}", messages);
        let response = self.provider.call_llm_api(messages).await?;
        debug!("LLM response: {}", response);
        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.call_llm_api(vec![ChatMessage::user(prompt)]).await
    }

    async fn chat(&self, turns: &[ChatMessage]) -> Result<String, LlmError> {
        self.call_llm_api(turns.to_vec()).await
    }
}
