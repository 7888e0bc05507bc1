mod chat;
mod content;
mod evaluator;
mod interview;
mod skill;

pub use chat::*;
pub use content::*;
pub use evaluator::*;
pub use interview::*;
pub use skill::*;

use crate::core::{AgentState, StateUpdate};

/// The one failure a unit may hand back to the caller.
///
/// Everything else is absorbed inside the unit and replaced by a fallback.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkerError {
    #[error("AI quota exceeded: {0}")]
    QuotaExceeded(String),
}

/// A single-purpose unit selected by the router.
#[async_trait::async_trait]
pub trait AgentBehavior: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Reads the state and produces this unit's contribution to it.
    async fn execute_step(&self, state: &AgentState) -> Result<StateUpdate, WorkerError>;
}
