use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation entry
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a chat message with a role and content
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: Role,
    /// Content/text of the message
    pub content: String,
}

impl ChatMessage {
    /// Creates a new chat message
    ///
    /// # Arguments
    /// * `role` - Role of the message sender
    /// * `content` - Content/text of the message
    pub fn new(role: Role, content: &str) -> Self {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    pub fn system(content: &str) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: &str) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::new(Role::Assistant, content)
    }
}
