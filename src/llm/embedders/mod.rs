/// Module for OpenAI embedder implementation
pub mod openai_embedder;

use async_trait::async_trait;

pub use openai_embedder::*;

use crate::llm::LlmError;

/// Trait defining interface for text embedding functionality
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds the given text into a vector of floating point numbers
    ///
    /// # Arguments
    ///
    /// * `text` - The text to embed
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}
