//! History reconstruction — turning the linear message log into protocol turns.
//!
//! The log is append-only and survives crashes, denials, and restarts, so
//! it can contain call intents whose results were never recorded. Replaying
//! such an orphaned call would hand the model a dangling functionCall with
//! no functionResponse, which the API rejects. `build_turns` enforces the
//! pairing invariant: a call intent is only emitted when the very next row
//! is its matching tool result.

use openpaw_core::message::{Message, Role};
use openpaw_core::turn::{ConversationTurn, FunctionCall, Part, TurnRole};
use tracing::debug;

/// Convert the ordered message log into the model-protocol turn sequence.
///
/// Deterministic and side-effect free: the same log always yields the same
/// turns. Rules, in log order:
///
/// - System rows are skipped (the system prompt travels out of band).
/// - A Tool row with a tool_call_id becomes a `function` turn whose single
///   part is a functionResponse named after the id.
/// - A Model row with a tool_call_id is emitted as a `model` turn with a
///   functionCall part only if the next row is the matching Tool row;
///   otherwise it is an orphan and is dropped.
/// - Plain Model/User rows become single-text `model`/`user` turns.
pub fn build_turns(messages: &[Message]) -> Vec<ConversationTurn> {
    let mut turns = Vec::with_capacity(messages.len());

    for (i, msg) in messages.iter().enumerate() {
        match msg.role {
            Role::System => continue,
            Role::Tool => {
                let Some(id) = msg.tool_call_id.as_deref() else {
                    debug!("skipping tool row without a call id");
                    continue;
                };
                turns.push(ConversationTurn {
                    role: TurnRole::Function,
                    parts: vec![Part::FunctionResponse {
                        name: id.to_string(),
                        response: serde_json::json!({ "result": msg.content }),
                    }],
                });
            }
            Role::Model => {
                if let Some(id) = msg.tool_call_id.as_deref() {
                    // Only replay the call if its result comes right after.
                    let paired = messages.get(i + 1).is_some_and(|next| {
                        next.role == Role::Tool && next.tool_call_id.as_deref() == Some(id)
                    });
                    if paired {
                        turns.push(ConversationTurn {
                            role: TurnRole::Model,
                            parts: vec![Part::FunctionCall(FunctionCall::new(
                                id,
                                serde_json::json!({}),
                            ))],
                        });
                    } else {
                        debug!(call = id, "pruning orphaned call intent from history");
                    }
                } else {
                    turns.push(ConversationTurn::model_text(&msg.content));
                }
            }
            Role::User => turns.push(ConversationTurn::user_text(&msg.content)),
        }
    }

    turns
}
