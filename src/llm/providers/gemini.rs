use super::{api_key, check_status, LlmProvider};
use crate::llm::{ChatMessage, LlmError, Role};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Provider implementation for Google's Gemini `generateContent` API
#[derive(Debug)]
pub struct GeminiProvider {
    /// Gemini API key loaded from environment
    api_key: String,
    /// Model identifier to use (e.g. "gemini-1.5-flash")
    model: String,
    /// Base URL the model path is appended to
    base_url: String,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider instance
    ///
    /// # Returns
    /// * `Result<Self, LlmError>` - Provider instance or error if API key not found
    pub fn new(model: &str, endpoint: Option<String>, client: Client) -> Result<Self, LlmError> {
        Ok(GeminiProvider {
            api_key: api_key("GEMINI_API_KEY")?,
            model: model.to_string(),
            base_url: endpoint.unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
            client,
        })
    }
}

/// Maps chat turns onto Gemini's `systemInstruction` + `contents` layout.
fn request_body(messages: &[ChatMessage]) -> Value {
    let system = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let contents: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "model",
                _ => "user",
            };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();

    let mut body = json!({ "contents": contents });
    if !system.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    body
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn call_llm_api(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body(&messages))
            .send()
            .await?;
        let res = check_status("Gemini", res).await?;

        let json_resp: Value = res.json().await?;
        if let Some(content) = json_resp["candidates"][0]["content"]["parts"][0]["text"].as_str() {
            Ok(content.trim().to_string())
        } else {
            Err(LlmError::Response("No content in Gemini LLM response".into()))
        }
    }
}
