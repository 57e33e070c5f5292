//! Progress events emitted while a turn runs.
//!
//! The loop is an ordered, single-consumer producer: events are pushed into
//! an unbounded channel as they happen and the caller renders them as they
//! arrive. The final event of a non-suspended turn is always `Text` or
//! `MaxTurns`.

use serde::{Deserialize, Serialize};

/// Events emitted by the agent loop during one call to `run_turn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The model announced an intent to use a tool. Always emitted before
    /// anything executes, approval-gated or not.
    Planning { tool: String },

    /// An unsafe call is parked; reply "yes"/"approve" to run it.
    ApprovalRequired { tool: String },

    /// The user denied the pending call.
    Denied { tool: String },

    /// A tool is executing.
    Executing { tool: String },

    /// A tool finished; `output` is a shortened preview.
    ToolResult { tool: String, output: String },

    /// The model's free-text reply — ends the turn.
    Text { content: String },

    /// A recoverable problem (missing tool, degraded transport).
    Error { message: String },

    /// The safety bound was hit; no further model calls this turn.
    MaxTurns { limit: u32 },
}

impl AgentEvent {
    /// The tag name for this event (stable, wire-friendly).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Planning { .. } => "planning",
            Self::ApprovalRequired { .. } => "approval_required",
            Self::Denied { .. } => "denied",
            Self::Executing { .. } => "executing",
            Self::ToolResult { .. } => "tool_result",
            Self::Text { .. } => "text",
            Self::Error { .. } => "error",
            Self::MaxTurns { .. } => "max_turns",
        }
    }
}

impl std::fmt::Display for AgentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning { tool } => write!(f, "[agent] planning to use {tool}"),
            Self::ApprovalRequired { tool } => write!(
                f,
                "[agent] approval required: {tool} (reply 'yes' to approve, anything else to deny)"
            ),
            Self::Denied { tool } => write!(f, "[agent] denied: {tool} will not run"),
            Self::Executing { tool } => write!(f, "[agent] executing {tool}..."),
            Self::ToolResult { tool, output } => write!(f, "[agent] {tool} result: {output}"),
            Self::Text { content } => write!(f, "{content}"),
            Self::Error { message } => write!(f, "[agent] error: {message}"),
            Self::MaxTurns { limit } => {
                write!(f, "[agent] max turns reached ({limit}), stopping")
            }
        }
    }
}

/// Shorten tool output for event previews.
pub(crate) fn preview(text: &str) -> String {
    const MAX: usize = 120;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_tags() {
        let event = AgentEvent::Planning {
            tool: "write_file".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"planning""#));
        assert!(json.contains(r#""tool":"write_file""#));
    }

    #[test]
    fn event_type_names() {
        assert_eq!(
            AgentEvent::ApprovalRequired { tool: "x".into() }.event_type(),
            "approval_required"
        );
        assert_eq!(AgentEvent::MaxTurns { limit: 5 }.event_type(), "max_turns");
    }

    #[test]
    fn display_is_tag_prefixed() {
        let s = AgentEvent::Executing {
            tool: "shell".into(),
        }
        .to_string();
        assert!(s.starts_with("[agent]"));
        assert!(s.contains("shell"));
    }

    #[test]
    fn preview_truncates_long_output() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert!(p.chars().count() <= 123);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"text","content":"hi"}"#;
        let event: AgentEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            AgentEvent::Text {
                content: "hi".into()
            }
        );
    }
}
