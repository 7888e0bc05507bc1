//! Main entry point for the application.
//!
//! Initializes logging, loads environment variables and configuration, runs
//! one workflow invocation over the state read from disk and prints the final
//! state as JSON on stdout.

mod cli;

use clap::Parser;
use learnflow::config::{self, EngineConfig};
use learnflow::core::rag::Corpus;
use learnflow::utils::init_logging;
use learnflow::{AgentState, Error, WorkerError, Workflow};
use serde_json::json;
use tracing::{error, info, warn};

/// Main entry point that initializes and runs the application.
///
/// # Initialization steps:
/// 1. Parse CLI arguments
/// 2. Initialize logging system
/// 3. Load environment variables
/// 4. Load configuration and the initial state
/// 5. Build the workflow and run one invocation
#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_logging(&cli.logging_level, cli.log_file);

    if let Err(e) = dotenvy::dotenv() {
        warn!("Failed to load .env file: {}", e);
    }

    if let Err(e) = run(&cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &cli::Cli) -> Result<(), Error> {
    let config = resolve_config(cli.config.as_deref())?;

    let raw = std::fs::read_to_string(&cli.state)?;
    let state: AgentState = serde_json::from_str(&raw)?;
    info!("Loaded initial state from {}", cli.state);

    let workflow = Workflow::from_config(&config).await?;
    let final_state = match workflow.run(state.clone()).await {
        Ok(final_state) => final_state,
        Err(err) => recover_from_quota(&config, state, err)?,
    };

    println!("{}", serde_json::to_string_pretty(&final_state)?);
    Ok(())
}

/// Explicit path first, then the platform config file if present, then defaults.
fn resolve_config(path: Option<&str>) -> Result<EngineConfig, Error> {
    if let Some(path) = path {
        return config::load_engine_config(path);
    }
    match config::default_config_path() {
        Some(path) if path.exists() => {
            info!("Using configuration from {}", path.display());
            config::load_engine_config(path)
        }
        _ => {
            info!("No configuration file found, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

/// Serves the static corpus lesson behind the quota banner.
fn recover_from_quota(
    config: &EngineConfig,
    mut state: AgentState,
    err: WorkerError,
) -> Result<AgentState, Error> {
    warn!("{}, falling back to static content", err);

    let Some(retrieval) = &config.retrieval else {
        return Err(err.into());
    };
    let corpus = Corpus::load(&retrieval.corpus_path)?;
    let Some(lesson) = cli::quota_lesson(&corpus, &state.payload) else {
        return Err(err.into());
    };

    let mut payload = learnflow::core::Payload::new();
    payload.insert("content".to_string(), json!(lesson));
    state.payload = payload;
    state.next_node = learnflow::RoutingDecision::End;
    Ok(state)
}
