//! Dialogue message domain types.
//!
//! These are the value objects that flow through the pipeline:
//! the persistence collaborator hands us a full history, the context window
//! manager projects a bounded suffix of it onto the wire shape, and exactly
//! one assistant message comes back per turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated ownership scope supplied by the identity collaborator.
///
/// `None` wherever an `Option<OwnerScope>` appears means global scope —
/// knowledge visible to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerScope(pub String);

impl OwnerScope {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions (persona, grounding)
    System,
}

/// A single message in a persisted conversation.
///
/// Append-only: the pipeline reads a suffix window of these and appends
/// exactly one assistant entry per turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueMessage {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Second candidate response from the comparison provider, if the turn
    /// ran in comparison mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_content: Option<String>,
}

impl DialogueMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            comparison_content: None,
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            comparison_content: None,
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            timestamp: Utc::now(),
            comparison_content: None,
        }
    }

    /// Attach a comparison-branch response (or inline error string).
    pub fn with_comparison(mut self, comparison: impl Into<String>) -> Self {
        self.comparison_content = Some(comparison.into());
        self
    }
}

/// The `{role, content}` projection sent to a provider.
///
/// Timestamps and comparison content never cross the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

impl From<&DialogueMessage> for PromptMessage {
    fn from(msg: &DialogueMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = DialogueMessage::user("Hello there");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello there");
        assert!(msg.comparison_content.is_none());
    }

    #[test]
    fn assistant_message_with_comparison() {
        let msg = DialogueMessage::assistant("primary answer")
            .with_comparison("secondary answer");
        assert_eq!(msg.comparison_content.as_deref(), Some("secondary answer"));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&PromptMessage::system("rules")).unwrap();
        assert!(json.contains(r#""role":"system""#));
    }

    #[test]
    fn projection_drops_timestamp_and_comparison() {
        let msg = DialogueMessage::assistant("answer").with_comparison("alt");
        let prompt = PromptMessage::from(&msg);
        let json = serde_json::to_value(&prompt).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert_eq!(json["content"], "answer");
    }
}
