use crate::llm::{ChatMessage, LlmError};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::fmt::Debug;
use std::time::Duration;

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

#[async_trait]
pub trait LlmProvider: Debug + Send + Sync {
    async fn call_llm_api(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}

/// Builds the HTTP client shared by a provider, bounded by `timeout_secs`.
pub fn http_client(timeout_secs: u64) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::Config(e.to_string()))
}

/// Reads an API key from the environment.
pub fn api_key(var: &str) -> Result<String, LlmError> {
    std::env::var(var).map_err(|_| LlmError::Config(format!("{} environment variable not set", var)))
}

/// Turns a non-success response into an error, keeping quota exhaustion distinct.
pub async fn check_status(provider: &str, res: Response) -> Result<Response, LlmError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    Err(classify_failure(provider, status, &text))
}

fn classify_failure(provider: &str, status: StatusCode, body: &str) -> LlmError {
    if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
        LlmError::QuotaExceeded(format!("{} API error ({}): {}", provider, status, body))
    } else {
        LlmError::Response(format!("{} API error ({}): {}", provider, status, body))
    }
}
