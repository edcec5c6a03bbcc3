//! Text-completion backends for CareBot.
//!
//! All backends implement the `carebot_core::Provider` trait.
//! The router picks one based on configuration.

pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
