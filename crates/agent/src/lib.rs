//! The CareBot dialogue core.
//!
//! A session follows an **Extract → Assemble → Complete → Remember** cycle
//! per user message, with symptom-driven doctor recommendations attached
//! alongside the reply:
//!
//! 1. **Receive** a user message (from the CLI or any other caller)
//! 2. **Extract** the doctor the message is about, if any
//! 3. **Assemble** persona, catalog, doctor context and recent turns
//! 4. **Complete** through the configured provider
//! 5. **Remember** the finished turn in session-owned memory
//!
//! The knowledge base and provider are shared read-only; memory belongs to
//! exactly one [`DialogueEngine`].

pub mod context;
pub mod engine;
pub mod recommend;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{
    ConversationMemory, EntityExtractor, ExtractedContext, MatchSource, Persona, PromptAssembler,
    PromptInput, DEFAULT_WINDOW,
};
pub use engine::{CompletionBinding, DialogueEngine, EngineSettings, TurnReply, apology};
pub use recommend::{
    FALLBACK_RECOMMENDATION, KeywordSymptomDetector, RecommendationEngine, SymptomDetector,
};
