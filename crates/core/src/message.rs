//! The persisted message log — the append-only record every turn is
//! reconstructed from.
//!
//! Four kinds of rows, distinguished by role + tool_call_id:
//! - User row: a user utterance
//! - Model row without tool_call_id: a model text reply
//! - Model row **with** tool_call_id and empty content: the model's intent
//!   to call a tool
//! - Tool row with tool_call_id: the result of executing that call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Who produced a log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The language model
    Model,
    /// System instructions (never replayed)
    System,
    /// Tool execution result
    Tool,
}

impl Role {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            "system" => Ok(Role::System),
            "tool" => Ok(Role::Tool),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row in the append-only message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who produced this row
    pub role: Role,

    /// The text content (empty for a model call-intent row)
    pub content: String,

    /// Keys a model call intent to its tool result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Insertion timestamp; the log is ordered by this plus rowid
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a model text reply.
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Record the model's intent to call a tool. Content is empty by
    /// contract; the call is identified by its name.
    pub fn call_intent(tool_call_id: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: String::new(),
            tool_call_id: Some(tool_call_id.into()),
            timestamp: Utc::now(),
        }
    }

    /// Record a tool result keyed to the call that produced it.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            timestamp: Utc::now(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// True if this row records a model call intent rather than text.
    pub fn is_call_intent(&self) -> bool {
        self.role == Role::Model && self.tool_call_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrip() {
        for role in [Role::User, Role::Model, Role::System, Role::Tool] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("wizard".parse::<Role>().is_err());
    }

    #[test]
    fn call_intent_has_empty_content() {
        let msg = Message::call_intent("write_file");
        assert!(msg.is_call_intent());
        assert!(msg.content.is_empty());
        assert_eq!(msg.tool_call_id.as_deref(), Some("write_file"));
    }

    #[test]
    fn tool_result_keyed_to_call() {
        let msg = Message::tool_result("get_current_time", "10:00");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("get_current_time"));
        assert!(!msg.is_call_intent());
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::user("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "Test message");
        assert_eq!(back.role, Role::User);
        assert!(back.tool_call_id.is_none());
    }
}
