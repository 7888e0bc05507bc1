use crate::constants::{ROUTER_RESPONSE_SCHEMA, ROUTER_SYSTEM_PROMPT};
use crate::core::{AgentState, Payload, RoutingDecision};
use crate::llm::{parse_structured, LanguageModel, Role};
use crate::utils::contains_all_ignore_case;
use std::sync::Arc;
use tracing::{info, warn};

/// Payload keys that select a unit, in priority order.
pub const PAYLOAD_ROUTES: [(&str, RoutingDecision); 4] = [
    ("quiz_results", RoutingDecision::Skill),
    ("topic_id", RoutingDecision::Content),
    ("submission", RoutingDecision::Evaluate),
    ("interview_topic", RoutingDecision::Interview),
];

/// Explicit routing: the first signal key present in the payload wins.
pub fn route_from_payload(payload: &Payload) -> Option<RoutingDecision> {
    PAYLOAD_ROUTES
        .iter()
        .find(|(key, _)| payload.contains_key(*key))
        .map(|(_, decision)| *decision)
}

/// Keyword shortcut: the latest entry is a user asking to start an interview.
pub fn is_interview_start(state: &AgentState) -> bool {
    state
        .messages
        .last()
        .is_some_and(|m| {
            m.role == Role::User && contains_all_ignore_case(&m.content, &["interview", "start"])
        })
}

/// Maps raw classifier output onto a unit.
///
/// Only `chat`, `skill`, `content` and `interview` are accepted; anything
/// else, including unparseable output, becomes `Chat`.
pub fn parse_classification(raw: &str) -> RoutingDecision {
    let Some(value) = parse_structured(ROUTER_RESPONSE_SCHEMA, raw) else {
        warn!("Supervisor: unusable classification {:?}, falling back to chat", raw);
        return RoutingDecision::Chat;
    };
    match value["next_node"].as_str() {
        Some("skill") => RoutingDecision::Skill,
        Some("content") => RoutingDecision::Content,
        Some("interview") => RoutingDecision::Interview,
        _ => RoutingDecision::Chat,
    }
}

/// Decides which unit handles the request, or that there is nothing to do.
pub struct Supervisor {
    llm: Arc<dyn LanguageModel>,
}

impl Supervisor {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Runs the decision tiers in order: payload keys, empty conversation,
    /// keyword shortcut, then a single classification call.
    pub async fn route(&self, state: &AgentState) -> RoutingDecision {
        if let Some(decision) = route_from_payload(&state.payload) {
            info!("Supervisor: routing to {} (payload signal)", decision);
            return decision;
        }

        if state.messages.is_empty() {
            info!("Supervisor: nothing to route, ending");
            return RoutingDecision::End;
        }

        if is_interview_start(state) {
            info!("Supervisor: routing to interview (keyword match)");
            return RoutingDecision::Interview;
        }

        let Some(message) = state.last_user_message() else {
            warn!("Supervisor: no user message to classify, falling back to chat");
            return RoutingDecision::Chat;
        };

        let prompt = format!("{}\n\nUser Message: {}", ROUTER_SYSTEM_PROMPT, message);
        let decision = match self.llm.complete(&prompt).await {
            Ok(raw) => parse_classification(&raw),
            Err(e) => {
                warn!("Supervisor LLM error: {}. Falling back to chat", e);
                RoutingDecision::Chat
            }
        };
        info!("Supervisor: routing to {}", decision);
        decision
    }
}
