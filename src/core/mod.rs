//! Core module containing the orchestration engine
//!
//! This module contains:
//! - The shared per-invocation state
//! - The router deciding which unit runs
//! - The workflow wiring router and units together
//! - RAG (Retrieval Augmented Generation) functionality

pub mod rag;
pub mod router;
mod state;
mod workflow;

pub use state::*;
pub use workflow::*;
