//! The agent orchestration core — the heart of OpenPaw.
//!
//! Each user input drives one bounded cycle:
//!
//! 1. **Settle** any pending approval (the input is the decision)
//! 2. **Rebuild** protocol history from the persisted log, pruning
//!    orphaned call intents
//! 3. **Call** the model with history plus tool declarations
//! 4. **Text** ends the turn; **function calls** are announced, gated
//!    when unsafe, dispatched otherwise, and their results replayed
//! 5. Repeat until text, a suspension, or the turn cap
//!
//! Progress streams out as [`AgentEvent`]s over an unbounded channel.

pub mod approval;
pub mod event;
pub mod history;
pub mod loop_runner;

pub use approval::{ApprovalGate, Resolution};
pub use event::AgentEvent;
pub use history::build_turns;
pub use loop_runner::{AgentLoop, DENIED_RESULT};
