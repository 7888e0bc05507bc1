use clap::Parser;
use learnflow::constants::{DEFAULT_LANGUAGE, DEFAULT_TOPIC, QUOTA_BANNER};
use learnflow::core::rag::Corpus;
use learnflow::core::Payload;

/// Command line interface for the application
#[derive(Parser)]
#[command(name = "learnflow", version, about)]
pub struct Cli {
    /// Path to the JSON file holding the initial state
    #[arg(short, long)]
    pub state: String,

    /// Path to the engine configuration (YAML, or TOML with a .toml extension)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Sets the logging verbosity level for the application
    /// Possible values: "error", "warn", "info", "debug", "trace"
    /// Default: "info"
    #[arg(long, default_value_t = String::from("info"))]
    pub logging_level: String,

    /// Also write logs to daily rotating files under ./logs
    #[arg(long)]
    pub log_file: bool,
}

/// Static lesson served when personalized generation hit the quota.
///
/// Looks the requested topic up in the corpus and prefixes its content with
/// the quota banner. `None` when the topic is unknown.
pub fn quota_lesson(corpus: &Corpus, payload: &Payload) -> Option<String> {
    let text = |key: &str, default: &str| {
        payload
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
            .to_string()
    };
    let topic = text("topic_id", DEFAULT_TOPIC);
    let language = text("language", DEFAULT_LANGUAGE);

    corpus
        .topic(&language, &topic)
        .map(|entry| format!("{}{}", QUOTA_BANNER, entry.content))
}
