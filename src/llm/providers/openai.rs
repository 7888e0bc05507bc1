use super::{api_key, check_status, LlmProvider};
use crate::llm::{ChatMessage, LlmError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Provider implementation for OpenAI's API
#[derive(Debug)]
pub struct OpenAiProvider {
    /// OpenAI API key loaded from environment
    api_key: String,
    /// Model identifier to use (e.g. "gpt-4o-mini")
    model: String,
    /// Chat completions endpoint
    endpoint: String,
    client: Client,
}

impl OpenAiProvider {
    /// Creates a new OpenAI provider instance
    ///
    /// # Arguments
    /// * `model` - The model identifier to use
    /// * `endpoint` - Optional override of the chat completions URL
    /// * `client` - HTTP client carrying the request timeout
    ///
    /// # Returns
    /// * `Result<Self, LlmError>` - Provider instance or error if API key not found
    pub fn new(model: &str, endpoint: Option<String>, client: Client) -> Result<Self, LlmError> {
        Ok(OpenAiProvider {
            api_key: api_key("OPENAI_API_KEY")?,
            model: model.to_string(),
            endpoint: endpoint.unwrap_or_else(|| OPENAI_CHAT_URL.to_string()),
            client,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    /// Calls OpenAI's chat completions API
    async fn call_llm_api(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let request_body = json!({
          "model": self.model,
          "messages": messages,
          "temperature": 0.7
        });

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;
        let res = check_status("OpenAI", res).await?;

        let json_resp: serde_json::Value = res.json().await?;
        if let Some(content) = json_resp["choices"][0]["message"]["content"].as_str() {
            Ok(content.trim().to_string())
        } else {
            Err(LlmError::Response("No content in OpenAI LLM response".into()))
        }
    }
}
