//! The human-in-the-loop approval gate.
//!
//! At most one unsafe call is ever outstanding per session. While a call is
//! pending, the next user input is interpreted as the decision: an exact
//! (trimmed, case-insensitive) "yes" or "approve" approves it; anything
//! else denies it. The slot is cleared on every resolution — a call is
//! offered exactly once, and a denial is terminal for that call.

use openpaw_core::turn::FunctionCall;
use tracing::debug;

/// The outcome of feeding user input through the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The pending call was approved and should now execute.
    Approved(FunctionCall),
    /// The pending call was denied; it will not execute.
    Denied(FunctionCall),
    /// Nothing was pending — treat the input as a fresh user message.
    NotPending,
}

/// Single-slot pending-approval state, owned by one agent session.
///
/// Never share a gate between sessions: concurrent turns would race on the
/// pending slot.
#[derive(Debug, Default)]
pub struct ApprovalGate {
    pending: Option<FunctionCall>,
}

impl ApprovalGate {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Park a call awaiting a decision. The loop stops after offering and
    /// returns control to the caller until the next user input arrives.
    pub fn offer(&mut self, call: FunctionCall) {
        debug!(tool = %call.name, "call parked awaiting approval");
        self.pending = Some(call);
    }

    /// Interpret user input against the pending slot and clear it.
    pub fn resolve(&mut self, user_text: &str) -> Resolution {
        let Some(call) = self.pending.take() else {
            return Resolution::NotPending;
        };

        let normalized = user_text.trim().to_lowercase();
        if normalized == "yes" || normalized == "approve" {
            Resolution::Approved(call)
        } else {
            Resolution::Denied(call)
        }
    }

    /// Whether a call is currently awaiting a decision.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The name of the pending call, if any.
    pub fn pending_tool(&self) -> Option<&str> {
        self.pending.as_ref().map(|c| c.name.as_str())
    }
}
