//! # OpenPaw Core
//!
//! Domain types, traits, and error definitions for the OpenPaw agent
//! orchestrator. This crate has **zero framework dependencies** — it
//! defines the contracts that every other crate implements against:
//!
//! - the persisted [`message::Message`] log and its roles
//! - the transient [`turn::ConversationTurn`] protocol shape
//! - the [`model::ModelClient`] adapter boundary
//! - the [`tool::Tool`] capability contract and its registry
//! - the [`store`] persistence contracts
//!
//! Implementations live in their own crates so they can be swapped and
//! stubbed in tests.

pub mod error;
pub mod message;
pub mod model;
pub mod store;
pub mod tool;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use model::{ModelClient, ModelResponse, ToolDeclaration};
pub use store::{MemoryItem, MemoryStore, MessageStore};
pub use tool::{Tool, ToolRegistry};
pub use turn::{ConversationTurn, FunctionCall, Part, TurnRole};
