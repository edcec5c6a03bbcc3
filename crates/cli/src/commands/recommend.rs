//! `carebot recommend`: doctor suggestions without a conversation.

use super::{load_config, load_knowledge};
use carebot_agent::RecommendationEngine;
use carebot_agent::recommend::matched_specialties;
use carebot_config::AppConfig;
use carebot_knowledge::KnowledgeBase;
use std::sync::Arc;

pub async fn run(symptoms: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let knowledge = load_knowledge(&config)?;

    let specialties: Vec<String> = matched_specialties(&symptoms)
        .iter()
        .map(|s| s.to_string())
        .collect();

    println!("  Gejala:        {symptoms}");
    if specialties.is_empty() {
        println!("  Spesialisasi:  (tidak dikenali)");
    } else {
        println!("  Spesialisasi:  {}", specialties.join(", "));
    }

    match suggestions(&config, knowledge, &symptoms)? {
        Some(lines) => {
            println!("  Fasilitas:     {}", config.chatbot.recommendation_facility);
            println!();
            for line in lines {
                println!("  {line}");
            }
        }
        None => {
            println!();
            println!("  Rekomendasi dinonaktifkan (chatbot.enable_recommendations = false).");
        }
    }

    Ok(())
}

/// Suggestion lines for `symptoms`, or `None` when recommendations are off.
fn suggestions(
    config: &AppConfig,
    knowledge: Arc<KnowledgeBase>,
    symptoms: &str,
) -> carebot_core::Result<Option<Vec<String>>> {
    let engine = RecommendationEngine::from_config(knowledge, &config.chatbot)?;
    if !engine.is_enabled() {
        return Ok(None);
    }
    Ok(Some(engine.recommend(symptoms)))
}
