use super::{AgentBehavior, WorkerError};
use crate::config::AgentConfig;
use crate::constants::*;
use crate::core::{AgentState, StateUpdate};
use crate::llm::{ChatMessage, LanguageModel};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// General tutor answering free-form questions.
///
/// The whole conversation is forwarded as a multi-turn call behind a system
/// instruction tailored to the learner profile.
pub struct ChatAgent {
    llm: Arc<dyn LanguageModel>,
    persona: String,
}

impl ChatAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, config: &AgentConfig) -> Self {
        Self {
            llm,
            persona: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| CHAT_SYSTEM_PROMPT.to_string()),
        }
    }

    fn system_prompt(&self, state: &AgentState) -> String {
        format!(
            "{}\n\nInteract with the student based on their profile:\n\
             - Learning Preference: {}\n\
             - Learning Speed: {}\n\
             - Difficulty Comfort: {}\n\
             - Feedback Style: {}\n\
             - Goal Orientation: {}",
            self.persona,
            state.profile_trait("learning_preference", DEFAULT_LEARNING_PREFERENCE),
            state.profile_trait("learning_speed", DEFAULT_LEARNING_SPEED),
            state.profile_trait("difficulty_comfort", DEFAULT_DIFFICULTY_COMFORT),
            state.profile_trait("feedback_style", DEFAULT_FEEDBACK_STYLE),
            state.profile_trait("goal_orientation", DEFAULT_GOAL_ORIENTATION),
        )
    }
}

#[async_trait]
impl AgentBehavior for ChatAgent {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn execute_step(&self, state: &AgentState) -> Result<StateUpdate, WorkerError> {
        debug!("ChatAgent: answering over {} turns", state.messages.len());

        let mut turns = Vec::with_capacity(state.messages.len() + 1);
        turns.push(ChatMessage::system(&self.system_prompt(state)));
        turns.extend(state.messages.iter().cloned());

        let response = match self.llm.chat(&turns).await {
            Ok(text) => text,
            Err(e) => {
                error!("ChatAgent error: {}", e);
                CHAT_FALLBACK_RESPONSE.to_string()
            }
        };

        Ok(StateUpdate::reply(&response))
    }
}
