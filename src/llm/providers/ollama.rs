use super::{check_status, LlmProvider};
use crate::llm::{ChatMessage, LlmError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const OLLAMA_CHAT_URL: &str = "http://localhost:11434/api/chat";

/// Provider implementation for Ollama's local API
#[derive(Debug)]
pub struct OllamaProvider {
    /// Model identifier to use (e.g. "llama3", "codellama")
    model: String,
    endpoint: String,
    client: Client,
}

impl OllamaProvider {
    /// Creates a new Ollama provider instance. No credentials are needed.
    pub fn new(model: &str, endpoint: Option<String>, client: Client) -> Self {
        OllamaProvider {
            model: model.to_string(),
            endpoint: endpoint.unwrap_or_else(|| OLLAMA_CHAT_URL.to_string()),
            client,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    /// Calls Ollama's chat API
    async fn call_llm_api(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let request_body = json!({
            "model": self.model,
            "stream": false,
            "messages": messages
        });

        let res = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;
        let res = check_status("Ollama", res).await?;

        let json_resp: serde_json::Value = res.json().await?;
        if let Some(content) = json_resp["message"]["content"].as_str() {
            Ok(content.trim().to_string())
        } else {
            Err(LlmError::Response("No content in Ollama LLM response".into()))
        }
    }
}
