//! The broadcast orchestration engine.
//!
//! One parameterized conversation flow serves both the organization-scoped
//! and the global broadcast: the [`scope::BroadcastScope`] supplies
//! everything that differs between them (allowed roles, authorization gate,
//! banner policy, preview truncation). The flow collects and validates the
//! text, previews it, and on confirmation resolves the recipients and hands
//! them to the sequential, rate-limited [`dispatch::Dispatcher`].

pub mod context;
pub mod dispatch;
pub mod machine;
pub mod report;
pub mod resolve;
pub mod scope;

pub use context::{BroadcastContext, ContextStore, Conversation, ConversationState};
pub use dispatch::{DispatchOutcome, Dispatcher, DispatcherConfig};
pub use machine::{BroadcastFlow, EventSource, FlowEvent, FlowOutcome};
pub use scope::{BroadcastScope, ScopeKind};
