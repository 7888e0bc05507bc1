use super::EngineConfig;
use crate::errors::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

/// Loads and parses the engine configuration.
///
/// Files ending in `.toml` are read as TOML, anything else as YAML.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read
/// * The content cannot be parsed into an EngineConfig
pub fn load_engine_config(file_path: impl AsRef<Path>) -> Result<EngineConfig, Error> {
    let path = file_path.as_ref();
    let raw = fs::read_to_string(path)?;
    let config: EngineConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&raw)?,
        _ => serde_yaml::from_str(&raw)?,
    };
    info!(
        "Loaded engine configuration from {} (provider: {}, model: {})",
        path.display(),
        config.llm.provider,
        config.llm.model
    );
    Ok(config)
}

/// `<config dir>/learnflow/config.yaml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("learnflow").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_yaml_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "llm:\n  provider: gemini\n  model: gemini-1.5-flash\nretrieval:\n  corpus_path: corpus.yaml\n"
        )
        .unwrap();

        let config = load_engine_config(file.path()).unwrap();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.timeout_secs, 60);
        let retrieval = config.retrieval.unwrap();
        assert_eq!(retrieval.top_k, 3);
        assert_eq!(retrieval.embedder_model, "text-embedding-3-small");
        assert!(config.agents.chat.system_prompt.is_none());
    }

    #[test]
    fn loads_toml_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[llm]\nprovider = \"ollama\"\nmodel = \"llama3\"\n\n[agents.interview]\nsystem_prompt = \"Be brief.\"\n"
        )
        .unwrap();

        let config = load_engine_config(file.path()).unwrap();
        assert_eq!(config.llm.provider, "ollama");
        assert!(config.retrieval.is_none());
        assert_eq!(config.agents.interview.system_prompt.as_deref(), Some("Be brief."));
    }

    #[test]
    fn empty_yaml_mapping_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "{{}}").unwrap();

        let config = load_engine_config(file.path()).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_engine_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
