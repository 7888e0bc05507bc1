use crate::llm::LlmError;

/// Errors raised while loading configuration, building the engine, or
/// handling a quota condition the CLI could not recover from.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Schema error: {0}")]
    SchemaError(String),
    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),
    #[error("Retrieval error: {0}")]
    RetrievalError(#[from] crate::core::rag::RetrievalError),
    #[error("Worker error: {0}")]
    WorkerError(#[from] crate::agents::WorkerError),
}
