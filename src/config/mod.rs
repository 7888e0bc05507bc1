mod parser;
use serde::{Deserialize, Serialize};

pub use parser::{default_config_path, load_engine_config};

/// Main configuration structure for the engine
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EngineConfig {
    /// Generative backend settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Optional retrieval corpus; absent means content generation runs without reference material
    #[serde(default)]
    pub retrieval: Option<RetrievalConfig>,
    /// Per-unit prompt overrides
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// Generative backend settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    /// Name of the LLM provider ("openai", "anthropic", "ollama", "gemini")
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Name/identifier of the model
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional override of the provider endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            endpoint: None,
        }
    }
}

/// Retrieval corpus settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Path of the YAML topic corpus
    pub corpus_path: String,
    /// Embedding model used to index and query the corpus
    #[serde(default = "default_embedder_model")]
    pub embedder_model: String,
    /// Number of chunks fetched per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Configuration for the units that accept prompt overrides
#[derive(Debug, Deserialize, Default, Clone, Serialize)]
pub struct AgentsConfig {
    #[serde(default)]
    pub chat: AgentConfig,
    #[serde(default)]
    pub interview: AgentConfig,
}

/// Configuration for a specific unit
#[derive(Debug, Deserialize, Default, Clone, Serialize)]
pub struct AgentConfig {
    /// Optional persona replacing the built-in one
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_embedder_model() -> String {
    "text-embedding-3-small".to_string()
}

pub(crate) fn default_top_k() -> usize {
    3
}
