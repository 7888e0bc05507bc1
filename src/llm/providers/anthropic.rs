use super::{api_key, check_status, LlmProvider};
use crate::llm::{ChatMessage, LlmError, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Provider implementation for Anthropic's API
#[derive(Debug)]
pub struct AnthropicProvider {
    /// Anthropic API key loaded from environment
    api_key: String,
    /// Model identifier to use
    model: String,
    endpoint: String,
    client: Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider instance
    ///
    /// # Returns
    /// * `Result<Self, LlmError>` - Provider instance or error if API key not found
    pub fn new(model: &str, endpoint: Option<String>, client: Client) -> Result<Self, LlmError> {
        Ok(AnthropicProvider {
            api_key: api_key("ANTHROPIC_API_KEY")?,
            model: model.to_string(),
            endpoint: endpoint.unwrap_or_else(|| ANTHROPIC_MESSAGES_URL.to_string()),
            client,
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    /// Calls Anthropic's messages API.
    ///
    /// System turns are folded into the top-level `system` field.
    async fn call_llm_api(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let (system_messages, messages): (Vec<_>, Vec<_>) = messages
            .into_iter()
            .partition(|msg| msg.role == Role::System);
        let system_content = system_messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");

        let request_body = json!({
            "model": self.model,
            "system": system_content,
            "max_tokens": 4096,
            "messages": messages
        });

        let res = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.to_string())
            .header("anthropic-version", "2023-06-01")
            .json(&request_body)
            .send()
            .await?;
        let res = check_status("Anthropic", res).await?;

        let json_resp: serde_json::Value = res.json().await?;
        if let Some(content) = json_resp["content"][0]["text"].as_str() {
            debug!("Anthropic response: {}", content);
            Ok(content.trim().to_string())
        } else {
            Err(LlmError::Response("No content in Anthropic LLM response".into()))
        }
    }
}
