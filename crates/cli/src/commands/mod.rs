pub mod chat;
pub mod doctor;
pub mod knowledge;
pub mod onboard;
pub mod recommend;

use carebot_config::AppConfig;
use carebot_core::KnowledgeError;
use carebot_knowledge::KnowledgeBase;
use std::sync::Arc;

/// Load and validate the config, with a readable error for the terminal.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The catalog named by `knowledge_path`, or the bundled one.
pub fn load_knowledge(config: &AppConfig) -> Result<Arc<KnowledgeBase>, KnowledgeError> {
    let kb = match &config.knowledge_path {
        Some(path) => KnowledgeBase::load_from(path)?,
        None => KnowledgeBase::builtin()?,
    };
    Ok(Arc::new(kb))
}

/// Print recommendation lines under a reply.
pub fn print_recommendations(lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    println!();
    for line in lines {
        println!("  {line}");
    }
}
