//! Core type definitions for grounded.
//!
//! Messages sent to the chat endpoint and the answer payload that comes back.

use serde::{Deserialize, Serialize};

/// Represents a participant role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a new message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }
}

/// The answer returned by a grounded chat completion.
///
/// `context` carries the raw citation/grounding metadata the backend attached
/// to the message, when present. It is kept as untyped JSON; this program only
/// prints it.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub content: String,
    pub context: Option<serde_json::Value>,
}

impl Answer {
    /// Render the answer for console output.
    ///
    /// The context block is included only when `show_citations` is set and the
    /// backend actually returned one.
    pub fn render(&self, show_citations: bool) -> String {
        match (&self.context, show_citations) {
            (Some(ctx), true) => {
                let pretty =
                    serde_json::to_string_pretty(ctx).unwrap_or_else(|_| ctx.to_string());
                format!("{}\n\n{}", self.content, pretty)
            }
            _ => self.content.clone(),
        }
    }
}
