//! Static healthcare knowledge for CareBot.
//!
//! The catalog is loaded once at startup (from TOML, or the bundled default)
//! and is read-only afterwards. Share it between sessions behind an `Arc`.

pub mod catalog;
pub mod model;

pub use catalog::{DoctorMatch, KnowledgeBase};
pub use model::{Doctor, Facility, Specialty};
