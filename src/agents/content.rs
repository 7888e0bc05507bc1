use super::{AgentBehavior, WorkerError};
use crate::constants::*;
use crate::core::rag::Retriever;
use crate::core::{AgentState, Payload, StateUpdate};
use crate::llm::{LanguageModel, LlmError};
use crate::utils::strip_code_fence;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Generates a personalized markdown lesson for one topic.
///
/// This is the only unit that lets a quota failure escape, so the caller can
/// serve cached content instead.
pub struct ContentAgent {
    llm: Arc<dyn LanguageModel>,
    retriever: Option<Arc<dyn Retriever>>,
    top_k: usize,
    retrieval_timeout: Duration,
}

/// Lesson text with one outer fence removed.
pub fn clean_lesson(raw: &str) -> String {
    strip_code_fence(raw).to_string()
}

impl ContentAgent {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        retriever: Option<Arc<dyn Retriever>>,
        top_k: usize,
    ) -> Self {
        Self {
            llm,
            retriever,
            top_k,
            retrieval_timeout: Duration::from_secs(RETRIEVAL_TIMEOUT_SECS),
        }
    }

    /// Upper bound on one retrieval lookup; past it the lesson is generated
    /// without reference material.
    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout = timeout;
        self
    }

    /// Reference material for the topic; empty when unavailable.
    async fn reference_material(&self, topic: &str, language: &str) -> String {
        let Some(retriever) = &self.retriever else {
            return String::new();
        };
        let query = format!("{} in {}", topic, language);
        let lookup = retriever.retrieve(&query, self.top_k);
        match tokio::time::timeout(self.retrieval_timeout, lookup).await {
            Ok(Ok(context)) => {
                debug!("ContentAgent: retrieved {} chars of context", context.len());
                context
            }
            Ok(Err(e)) => {
                warn!("ContentAgent: retrieval failed, continuing without it: {}", e);
                String::new()
            }
            Err(_) => {
                warn!(
                    "ContentAgent: retrieval timed out after {:?}, continuing without it",
                    self.retrieval_timeout
                );
                String::new()
            }
        }
    }

    fn build_prompt(state: &AgentState, topic: &str, language: &str, level: &str, reference: &str) -> String {
        let preference = state.profile_trait("learning_preference", DEFAULT_LEARNING_PREFERENCE);
        format!(
            "You are an expert programming tutor.\n\
             The student is struggling with the topic: \"{topic}\" in {language} ({level} level).\n\n\
             **Student Profile:**\n\
             - **Learning Style:** {preference} (Tailor explanations accordingly)\n\
             - **Pace:** {pace}\n\
             - **Preferred Difficulty:** {difficulty}\n\
             - **Feedback Preference:** {feedback}\n\n\
             **Official Course Curriculum (Use this as the source of truth):**\n\
             {reference}\n\n\
             Generate a concise but comprehensive lesson to help them master this concept.\n\n\
             Structure your response in Markdown with exactly these four sections:\n\
             1. **Concept Simplified**: A very clear explanation tailored to their {preference} style. \
             Use **Markdown Tables** for any structured data or comparisons.\n\
             2. **Common Pitfalls**: What mistakes do beginners usually make here?\n\
             3. **Code Example**: A clear, commented code snippet demonstrating the concept.\n\
             4. **Key Takeaway**: One sentence summary to remember.\n\n\
             Do not include any preamble or postscript. Return only the Markdown content.",
            pace = state.profile_trait("learning_speed", DEFAULT_LEARNING_SPEED),
            difficulty = state.profile_trait("difficulty_comfort", DEFAULT_DIFFICULTY_COMFORT),
            feedback = state.profile_trait("feedback_style", DEFAULT_FEEDBACK_STYLE),
        )
    }
}

#[async_trait]
impl AgentBehavior for ContentAgent {
    fn name(&self) -> &'static str {
        "content"
    }

    async fn execute_step(&self, state: &AgentState) -> Result<StateUpdate, WorkerError> {
        let topic = state.payload_text("topic_id", DEFAULT_TOPIC);
        let language = state.payload_text("language", DEFAULT_LANGUAGE);
        let level = state.payload_text("level", DEFAULT_LEVEL);
        debug!("ContentAgent: generating lesson for {} ({})", topic, language);

        let reference = self.reference_material(&topic, &language).await;
        let prompt = Self::build_prompt(state, &topic, &language, &level, &reference);

        let content = match self.llm.complete(&prompt).await {
            Ok(raw) => clean_lesson(&raw),
            Err(LlmError::QuotaExceeded(detail)) => {
                warn!("ContentAgent: quota exceeded for {}", topic);
                return Err(WorkerError::QuotaExceeded(detail));
            }
            Err(e) => {
                error!("ContentAgent error: {}", e);
                format!(
                    "Error generating personalized content for {}. Please try again later.",
                    topic
                )
            }
        };

        let mut payload = Payload::new();
        payload.insert("content".to_string(), json!(content));
        Ok(StateUpdate::payload(payload))
    }
}
