//! # CareBot Core
//!
//! Domain types, traits, and error definitions for the CareBot assistant.
//! This crate has **no framework dependencies**: it defines the vocabulary
//! every other crate in the workspace implements against.
//!
//! - [`Provider`] is the single completion boundary. Gemini, OpenAI-compatible
//!   endpoints and test doubles all implement it.
//! - [`ConversationTurn`] is the unit stored in conversational memory.
//! - [`Error`] and its bounded-context variants describe every failure mode.

pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, KnowledgeError, ProviderError, Result};
pub use message::{ConversationTurn, SessionId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
