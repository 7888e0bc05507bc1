//! Request-scoped orchestration engine for an adaptive learning assistant.
//!
//! Each invocation takes a caller-owned [`core::AgentState`], lets the router
//! pick at most one unit (chat, skill ordering, content generation,
//! evaluation or interview), applies that unit's update and hands the state
//! back.

pub mod agents;
pub mod config;
pub mod constants;
pub mod core;
pub mod errors;
pub mod llm;
pub mod utils;

pub use crate::agents::WorkerError;
pub use crate::core::{AgentState, RoutingDecision, Workflow};
pub use crate::errors::Error;
