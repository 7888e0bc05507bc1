use super::Embedder;
use crate::llm::providers::{api_key, check_status, http_client};
use crate::llm::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// OpenAI embedder implementation that uses OpenAI's API to generate text embeddings
#[derive(Debug)]
pub struct OpenAIEmbedder {
    /// OpenAI API key used for authentication
    api_key: String,
    /// Name of the OpenAI model to use for embeddings
    pub model: String,
    client: Client,
}

impl OpenAIEmbedder {
    /// Creates a new OpenAIEmbedder instance
    ///
    /// # Returns
    ///
    /// A Result containing either:
    /// * A new OpenAIEmbedder instance
    /// * An error if the OPENAI_API_KEY environment variable is not set
    ///
    /// Each request is bounded by `timeout_secs`.
    pub fn new(model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: api_key("OPENAI_API_KEY")?,
            model: model.to_string(),
            client: http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let body = json!({
            "input": text,
            "model": self.model
        });

        let res = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let res = check_status("OpenAI", res).await?;

        let json_resp: serde_json::Value = res.json().await?;
        let arr = json_resp["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| LlmError::Response("No embedding".into()))?;
        let embedding: Vec<f32> = arr
            .iter()
            .filter_map(|x| x.as_f64())
            .map(|x| x as f32)
            .collect();
        Ok(embedding)
    }
}
