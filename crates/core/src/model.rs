//! ModelClient trait — the abstraction over the LLM backend.
//!
//! The agent loop hands a reconstructed turn sequence plus the declared
//! tools to `generate` and gets back either free text or one-or-more
//! function calls. The transport behind it (HTTP framing, auth, endpoint
//! selection) lives in the adapter crates.

use crate::error::ProviderError;
use crate::turn::{ConversationTurn, FunctionCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tool declaration advertised to the model.
///
/// Deliberately excludes the unsafe flag and the execute function — those
/// are orchestrator-internal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,

    /// JSON Schema for the tool's parameters
    pub parameters: serde_json::Value,
}

/// One round trip's worth of model output: free text, function calls, or
/// (rarely) both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCall>,
}

impl ModelResponse {
    /// A text-only response. Also used by the loop to degrade transport
    /// failures into something the conversation can absorb.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_calls: Vec::new(),
        }
    }

    /// True when the model requested no tool invocations this round.
    pub fn is_text_only(&self) -> bool {
        self.function_calls.is_empty()
    }
}

/// The core model client trait.
///
/// Implementations must return all function calls issued in a single
/// response together, so the loop can replay them as one model turn.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// A human-readable name for this client (e.g., "gemini").
    fn name(&self) -> &str;

    /// One request/response round trip with the model.
    async fn generate(
        &self,
        turns: &[ConversationTurn],
        tools: &[ToolDeclaration],
    ) -> std::result::Result<ModelResponse, ProviderError>;

    /// List the models available behind this client.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}
