//! Symptom-driven doctor suggestions.
//!
//! Unlike extraction, every symptom phrase is checked and the matched
//! specialties are unioned. Only one facility is ever searched, and only
//! doctors currently taking patients are suggested. Output is advisory text,
//! never a diagnosis.

use carebot_config::ChatbotConfig;
use carebot_core::error::{Error, Result};
use carebot_knowledge::{KnowledgeBase, Specialty};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Symptom phrase → specialty table.
pub const SYMPTOM_SPECIALTIES: &[(&str, Specialty)] = &[
    ("demam", Specialty::PenyakitDalam),
    ("batuk", Specialty::PenyakitDalam),
    ("pilek", Specialty::PenyakitDalam),
    ("sakit perut", Specialty::PenyakitDalam),
    ("diare", Specialty::PenyakitDalam),
    ("sakit kepala", Specialty::Saraf),
    ("migrain", Specialty::Saraf),
    ("nyeri dada", Specialty::JantungDanPembuluhDarah),
    ("sesak napas", Specialty::JantungDanPembuluhDarah),
    ("ruam", Specialty::KulitDanKelamin),
    ("gatal", Specialty::KulitDanKelamin),
    ("mata merah", Specialty::Mata),
    ("pandangan kabur", Specialty::Mata),
    ("hamil", Specialty::KandunganDanKebidanan),
    ("kehamilan", Specialty::KandunganDanKebidanan),
];

/// Words that mark a message as symptom-related.
pub const SYMPTOM_KEYWORDS: &[&str] = &["gejala", "sakit", "nyeri", "demam", "batuk", "pusing", "mual"];

pub const FALLBACK_RECOMMENDATION: &str = "💡 Untuk gejala yang Anda sebutkan, disarankan berkonsultasi dengan dokter umum atau spesialis penyakit dalam.";

// ── Symptom detection ─────────────────────────────────────────────────────

/// Decides whether a user message warrants recommendations.
pub trait SymptomDetector: Send + Sync {
    fn is_symptomatic(&self, text: &str) -> bool;
}

impl<F> SymptomDetector for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_symptomatic(&self, text: &str) -> bool {
        self(text)
    }
}

/// Case-insensitive substring match against [`SYMPTOM_KEYWORDS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSymptomDetector;

impl SymptomDetector for KeywordSymptomDetector {
    fn is_symptomatic(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        SYMPTOM_KEYWORDS.iter().any(|k| lowered.contains(k))
    }
}

// ── Recommendations ───────────────────────────────────────────────────────

pub struct RecommendationEngine {
    knowledge: Arc<KnowledgeBase>,
    facility: String,
    enabled: bool,
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("facility", &self.facility)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl RecommendationEngine {
    /// An enabled engine must point at a facility that exists in the catalog.
    pub fn new(knowledge: Arc<KnowledgeBase>, facility: impl Into<String>, enabled: bool) -> Result<Self> {
        let facility = facility.into();
        if enabled && knowledge.facility(&facility).is_none() {
            return Err(Error::config(format!(
                "recommendation facility '{facility}' is not in the knowledge catalog"
            )));
        }
        Ok(Self {
            knowledge,
            facility,
            enabled,
        })
    }

    /// Engine honoring the `[chatbot]` recommendation switch and facility.
    pub fn from_config(knowledge: Arc<KnowledgeBase>, config: &ChatbotConfig) -> Result<Self> {
        Self::new(
            knowledge,
            config.recommendation_facility.clone(),
            config.enable_recommendations,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn facility(&self) -> &str {
        &self.facility
    }

    /// Suggestion lines for `symptoms`. Never empty while enabled: when no
    /// doctor can be suggested, the single fallback line is returned.
    pub fn recommend(&self, symptoms: &str) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }

        let specialties = matched_specialties(symptoms);
        let mut lines = Vec::new();

        if let Some(facility) = self.knowledge.facility(&self.facility) {
            for specialty in &specialties {
                if let Some(doctor) = facility.available_doctor(*specialty) {
                    lines.push(format!(
                        "💡 Rekomendasi: {} ({}) di {}",
                        doctor.name, specialty, facility.name
                    ));
                }
            }
        }

        debug!(
            matched = specialties.len(),
            suggested = lines.len(),
            facility = %self.facility,
            "Recommendations computed"
        );

        if lines.is_empty() {
            lines.push(FALLBACK_RECOMMENDATION.to_string());
        }
        lines
    }
}

/// Every specialty whose symptom phrase occurs in `text`, deduplicated.
pub fn matched_specialties(text: &str) -> BTreeSet<Specialty> {
    let lowered = text.to_lowercase();
    SYMPTOM_SPECIALTIES
        .iter()
        .filter(|(phrase, _)| lowered.contains(phrase))
        .map(|(_, specialty)| *specialty)
        .collect()
}
