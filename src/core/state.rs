use crate::llm::{ChatMessage, Role};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Free-form task data. Its key set is the primary routing signal.
pub type Payload = Map<String, Value>;

/// Named learner traits (`learning_preference`, `learning_speed`, ...).
pub type UserProfile = Map<String, Value>;

/// Which unit runs next, or whether execution stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoutingDecision {
    Chat,
    Skill,
    Content,
    Evaluate,
    Interview,
    #[default]
    End,
}

impl RoutingDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingDecision::Chat => "chat",
            RoutingDecision::Skill => "skill",
            RoutingDecision::Content => "content",
            RoutingDecision::Evaluate => "evaluate",
            RoutingDecision::Interview => "interview",
            RoutingDecision::End => "end",
        }
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data carried through one invocation.
///
/// Created by the caller, mutated by the router and at most one unit, then
/// handed back. The conversation is append-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub user_profile: UserProfile,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub next_node: RoutingDecision,
}

/// What a unit contributes to the state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    /// Entries appended to the conversation, in order
    pub messages: Vec<ChatMessage>,
    /// Replacement payload, if the unit produces one
    pub payload: Option<Payload>,
}

impl StateUpdate {
    pub fn reply(text: &str) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(text)],
            payload: None,
        }
    }

    pub fn payload(payload: Payload) -> Self {
        Self {
            messages: Vec::new(),
            payload: Some(payload),
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl AgentState {
    pub fn new(messages: Vec<ChatMessage>, user_profile: UserProfile, payload: Payload) -> Self {
        Self {
            messages,
            user_profile,
            payload,
            next_node: RoutingDecision::End,
        }
    }

    /// Merges a unit's output and marks the invocation finished.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if let Some(payload) = update.payload {
            self.payload = payload;
        }
        self.next_node = RoutingDecision::End;
    }

    /// Text of the most recent user entry.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Profile trait rendered as text, or `default` when absent or null.
    pub fn profile_trait(&self, key: &str, default: &str) -> String {
        value_as_text(self.user_profile.get(key), default)
    }

    /// Payload entry rendered as text, or `default` when absent or null.
    pub fn payload_text(&self, key: &str, default: &str) -> String {
        value_as_text(self.payload.get(key), default)
    }
}

fn value_as_text(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
