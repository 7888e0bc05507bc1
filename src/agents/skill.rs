use super::{AgentBehavior, WorkerError};
use crate::constants::SKILL_RESPONSE_SCHEMA;
use crate::core::{AgentState, Payload, StateUpdate};
use crate::llm::{parse_structured, LanguageModel};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Orders the available topics weakest-first from quiz results.
pub struct SkillAgent {
    llm: Arc<dyn LanguageModel>,
}

/// Topic titles in their given order. Entries may be plain strings or
/// objects with a `title` field.
pub fn topic_titles(available: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = available else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            Value::Object(obj) => obj
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Reverse of the input order. When reversing changes nothing (a palindrome
/// such as `["A", "B", "A"]`), the list is rotated by one instead.
fn reversed(titles: &[String]) -> Vec<String> {
    let mut order: Vec<String> = titles.iter().rev().cloned().collect();
    if order == titles && !order.is_empty() {
        order.rotate_left(1);
    }
    order
}

fn is_permutation(candidate: &[String], titles: &[String]) -> bool {
    let mut a = candidate.to_vec();
    let mut b = titles.to_vec();
    a.sort();
    b.sort();
    a == b
}

/// Validates the model's reordering against the input titles.
///
/// Anything that is not a permutation of `titles` falls back to the reversed
/// input. A permutation identical to the input is reversed as well, so the
/// result never repeats the input order unless every title is the same.
pub fn reorder_topics(titles: &[String], raw: &str) -> Vec<String> {
    let parsed: Option<Vec<String>> = parse_structured(SKILL_RESPONSE_SCHEMA, raw)
        .and_then(|value| serde_json::from_value(value).ok());

    let Some(ordered) = parsed else {
        warn!("SkillAgent: LLM returned a non-list, reversing input order");
        return reversed(titles);
    };
    if ordered.len() != titles.len() {
        warn!(
            "SkillAgent: LLM returned {} topics for {}, reversing input order",
            ordered.len(),
            titles.len()
        );
        return reversed(titles);
    }
    if !is_permutation(&ordered, titles) {
        warn!("SkillAgent: LLM changed the topic set, reversing input order");
        return reversed(titles);
    }
    if ordered == titles {
        debug!("SkillAgent: LLM kept the input order, forcing reversal");
        return reversed(titles);
    }
    ordered
}

impl SkillAgent {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    fn build_prompt(quiz_results: &Value, titles: &[String]) -> String {
        format!(
            "You are an expert educational AI.\n\
             Analyze the following quiz answers and the list of available topics.\n\
             Identify the user's weak areas based on incorrect answers.\n\
             Return the 'available_topics' list reordered such that the WEAKEST topics \
             (needing most attention) come FIRST.\n\
             Do not add or remove any topics.\n\n\
             Quiz Results (Question, Answer, Correctness):\n{}\n\n\
             Available Topics:\n{}\n\n\
             Return ONLY a JSON array of strings representing the reordered topics.",
            quiz_results,
            json!(titles)
        )
    }
}

#[async_trait]
impl AgentBehavior for SkillAgent {
    fn name(&self) -> &'static str {
        "skill"
    }

    async fn execute_step(&self, state: &AgentState) -> Result<StateUpdate, WorkerError> {
        let quiz_results = state.payload.get("quiz_results").cloned().unwrap_or(json!([]));
        let titles = topic_titles(state.payload.get("available_topics"));
        debug!("SkillAgent: ordering {} topics", titles.len());

        let ordered = if titles.is_empty() {
            Vec::new()
        } else {
            match self.llm.complete(&Self::build_prompt(&quiz_results, &titles)).await {
                Ok(raw) => reorder_topics(&titles, &raw),
                Err(e) => {
                    error!("SkillAgent error: {}", e);
                    reversed(&titles)
                }
            }
        };

        let mut payload = Payload::new();
        payload.insert("ordered_titles".to_string(), json!(ordered));
        Ok(StateUpdate::payload(payload))
    }
}
