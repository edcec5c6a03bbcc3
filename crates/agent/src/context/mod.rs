//! Per-turn context: what the message is about, what was said before,
//! and how both are laid out in the prompt.
//!
//! | Module | Role |
//! |--------|------|
//! | [`extractor`] | Doctor lookup by name, then by specialty keyword |
//! | [`memory`] | Bounded turn log owned by one session |
//! | [`assembler`] | Deterministic prompt layout |

pub mod assembler;
pub mod extractor;
pub mod memory;

pub use assembler::{Persona, PromptAssembler, PromptInput};
pub use extractor::{EntityExtractor, ExtractedContext, MatchSource, SPECIALTY_KEYWORDS};
pub use memory::{ConversationMemory, DEFAULT_CAPACITY, DEFAULT_WINDOW};
