//! Protocol turn types — the shape the model's function-calling API consumes.
//!
//! Turns are built fresh from the message log for every request (see the
//! agent crate's history module) and never persisted.

use serde::{Deserialize, Serialize};

/// A model-issued request to invoke a named capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name as declared to the model
    pub name: String,

    /// Raw JSON arguments, decoded lazily by the tool
    #[serde(default)]
    pub args: serde_json::Value,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// The role tag of a protocol turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
    Function,
}

/// One part of a turn. A turn carrying several function calls (or several
/// responses) holds them as separate parts of the same turn — calls made
/// together are replayed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse {
        name: String,
        response: serde_json::Value,
    },
    InlineImage {
        mime_type: String,
        /// Base64-encoded image bytes
        data: String,
    },
}

/// One role-tagged unit of conversation exchanged with the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub parts: Vec<Part>,
}

impl ConversationTurn {
    /// A user turn with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A model turn with a single text part.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A model turn carrying one FunctionCall part per call.
    pub fn model_calls(calls: &[FunctionCall]) -> Self {
        Self {
            role: TurnRole::Model,
            parts: calls
                .iter()
                .cloned()
                .map(Part::FunctionCall)
                .collect(),
        }
    }

    /// A function turn carrying one FunctionResponse part per executed call.
    /// Results are wrapped as `{"result": <text>}` — the API wants an object.
    pub fn function_responses(results: &[(String, String)]) -> Self {
        Self {
            role: TurnRole::Function,
            parts: results
                .iter()
                .map(|(name, result)| Part::FunctionResponse {
                    name: name.clone(),
                    response: serde_json::json!({ "result": result }),
                })
                .collect(),
        }
    }
}
