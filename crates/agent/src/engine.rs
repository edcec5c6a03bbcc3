//! The dialogue engine: one conversational turn, start to finish.
//!
//! Each turn runs the same fixed sequence:
//!
//! 1. **Extract** doctor context from the message
//! 2. **Assemble** the prompt with the last [`DEFAULT_WINDOW`] turns
//! 3. **Complete** via the bound provider (one call, no retries)
//! 4. **Remember** the turn, only if the call succeeded
//! 5. **Recommend** doctors when the message looks symptom-related
//!
//! Provider failures never escape `handle_turn`; they become an apology
//! reply and leave memory untouched.

use crate::context::assembler::{Persona, PromptAssembler, PromptInput};
use crate::context::extractor::EntityExtractor;
use crate::context::memory::{ConversationMemory, DEFAULT_WINDOW};
use crate::recommend::{KeywordSymptomDetector, RecommendationEngine, SymptomDetector};
use carebot_config::{AppConfig, ChatbotConfig, validate_temperature};
use carebot_core::error::{Error, ProviderError, Result};
use carebot_core::message::{ConversationTurn, SessionId};
use carebot_core::provider::{Provider, ProviderRequest};
use carebot_knowledge::KnowledgeBase;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Provider plus the generation settings every request is sent with.
#[derive(Clone)]
pub struct CompletionBinding {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for CompletionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionBinding")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl CompletionBinding {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Self> {
        validate_temperature(temperature).map_err(|e| Error::config(e.to_string()))?;
        if max_tokens == 0 {
            return Err(Error::config("max_tokens must be greater than 0"));
        }
        Ok(Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens,
        })
    }

    /// Bind `provider` with the model and generation settings from `config`.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Result<Self> {
        Self::new(provider, config.model.clone(), config.temperature, config.max_tokens)
    }

    /// A new binding to the same provider and model at another temperature.
    pub fn with_temperature(&self, temperature: f32) -> Result<Self> {
        Self::new(
            Arc::clone(&self.provider),
            self.model.clone(),
            temperature,
            self.max_tokens,
        )
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn request(&self, prompt: String) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            prompt,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }
}

/// Behaviour switches for a dialogue session.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub persona: Persona,
    pub enable_memory: bool,
    pub enable_recommendations: bool,
    /// The only facility searched for recommendations.
    pub recommendation_facility: String,
}

impl EngineSettings {
    pub fn from_config(config: &ChatbotConfig) -> Self {
        Self {
            persona: Persona::from_config(config),
            enable_memory: config.enable_memory,
            enable_recommendations: config.enable_recommendations,
            recommendation_facility: config.recommendation_facility.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&ChatbotConfig::default())
    }
}

/// What a turn produces: the reply, plus any doctor suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReply {
    pub reply: String,
    pub recommendations: Vec<String>,
}

/// Reply text shown when the completion backend fails.
pub fn apology(error: &ProviderError) -> String {
    format!("Maaf, terjadi kesalahan: {error}. Silakan coba lagi.")
}

/// One dialogue session over a shared knowledge base.
pub struct DialogueEngine {
    session_id: SessionId,
    knowledge: Arc<KnowledgeBase>,
    binding: CompletionBinding,
    persona_text: String,
    knowledge_summary: String,
    memory_enabled: bool,
    memory: ConversationMemory,
    recommender: RecommendationEngine,
    symptom_detector: Box<dyn SymptomDetector>,
}

impl DialogueEngine {
    /// Build a session. Fails when recommendations are enabled for a
    /// facility the catalog does not contain.
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        binding: CompletionBinding,
        settings: EngineSettings,
        memory: ConversationMemory,
    ) -> Result<Self> {
        let recommender = RecommendationEngine::new(
            Arc::clone(&knowledge),
            settings.recommendation_facility.clone(),
            settings.enable_recommendations,
        )?;

        let session_id = SessionId::new();
        info!(
            session = %session_id,
            provider = binding.provider_name(),
            model = binding.model(),
            memory = settings.enable_memory,
            recommendations = settings.enable_recommendations,
            "Dialogue session started"
        );

        Ok(Self {
            session_id,
            persona_text: PromptAssembler::render_persona(&settings.persona),
            knowledge_summary: knowledge.render_summary(),
            knowledge,
            binding,
            memory_enabled: settings.enable_memory && memory.is_enabled(),
            memory,
            recommender,
            symptom_detector: Box::new(KeywordSymptomDetector),
        })
    }

    /// Wire a whole session from application config.
    pub fn from_config(
        config: &AppConfig,
        knowledge: Arc<KnowledgeBase>,
        provider: Arc<dyn Provider>,
    ) -> Result<Self> {
        let binding = CompletionBinding::from_config(provider, config)?;
        let memory = ConversationMemory::new(config.chatbot.enable_memory);
        Self::new(
            knowledge,
            binding,
            EngineSettings::from_config(&config.chatbot),
            memory,
        )
    }

    /// Replace the predicate that decides when to recommend.
    pub fn with_symptom_detector(mut self, detector: impl SymptomDetector + 'static) -> Self {
        self.symptom_detector = Box::new(detector);
        self
    }

    /// Run one conversational turn.
    pub async fn handle_turn(&mut self, user_text: &str) -> TurnReply {
        let prompt = self.preview_prompt(user_text);
        debug!(
            session = %self.session_id,
            prompt_chars = prompt.len(),
            "Prompt assembled"
        );

        let reply = match self.binding.provider.complete(self.binding.request(prompt)).await {
            Ok(response) => {
                let reply = response.text.trim().to_string();
                if self.memory_enabled {
                    self.memory
                        .append(ConversationTurn::new(user_text, reply.clone()));
                }
                reply
            }
            Err(e) => {
                warn!(
                    session = %self.session_id,
                    provider = self.binding.provider_name(),
                    error = %e,
                    "Completion failed"
                );
                apology(&e)
            }
        };

        let recommendations = if self.symptom_detector.is_symptomatic(user_text) {
            self.recommender.recommend(user_text)
        } else {
            Vec::new()
        };

        TurnReply {
            reply,
            recommendations,
        }
    }

    /// The prompt `handle_turn` would send for `user_text` right now.
    pub fn preview_prompt(&self, user_text: &str) -> String {
        let context = EntityExtractor::new(&self.knowledge).extract(user_text);
        if let Some(ctx) = &context {
            debug!(doctor = %ctx.doctor.name, facility = %ctx.facility, "Doctor context attached");
        }

        let history: &[ConversationTurn] = if self.memory_enabled {
            self.memory.recent_window(DEFAULT_WINDOW)
        } else {
            &[]
        };

        PromptAssembler::assemble(&PromptInput {
            persona: &self.persona_text,
            knowledge_summary: &self.knowledge_summary,
            context: context.as_ref(),
            history,
            user_message: user_text,
        })
    }

    pub fn clear_history(&mut self) {
        let dropped = self.memory.len();
        self.memory.clear();
        info!(session = %self.session_id, dropped, "Conversation history cleared");
    }

    /// Rebind the provider at a new temperature (0.0 - 1.0).
    pub fn set_temperature(&mut self, temperature: f32) -> Result<()> {
        self.binding = self.binding.with_temperature(temperature)?;
        info!(session = %self.session_id, temperature, "Temperature updated");
        Ok(())
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn binding(&self) -> &CompletionBinding {
        &self.binding
    }

    pub fn recommender(&self) -> &RecommendationEngine {
        &self.recommender
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::FALLBACK_RECOMMENDATION;
    use crate::test_helpers::{ScriptedProvider, network_error};
    use carebot_config::Style;

    fn builtin() -> Arc<KnowledgeBase> {
        Arc::new(KnowledgeBase::builtin().unwrap())
    }

    fn engine_with(provider: Arc<ScriptedProvider>, settings: EngineSettings) -> DialogueEngine {
        let binding = CompletionBinding::new(provider, "test-model", 0.7, 1000).unwrap();
        let memory = ConversationMemory::new(settings.enable_memory);
        DialogueEngine::new(builtin(), binding, settings, memory).unwrap()
    }

    fn engine(provider: Arc<ScriptedProvider>) -> DialogueEngine {
        engine_with(provider, EngineSettings::default())
    }

    #[tokio::test]
    async fn successful_turn_is_trimmed_and_remembered() {
        let provider = Arc::new(ScriptedProvider::replies(&["  Halo! Ada yang bisa dibantu?\n"]));
        let mut engine = engine(provider.clone());

        let turn = engine.handle_turn("halo").await;

        assert_eq!(turn.reply, "Halo! Ada yang bisa dibantu?");
        assert!(turn.recommendations.is_empty());
        assert_eq!(engine.memory().len(), 1);
        assert_eq!(engine.memory().turns()[0].user(), "halo");
        assert_eq!(engine.memory().turns()[0].assistant(), "Halo! Ada yang bisa dibantu?");

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "test-model");
        assert_eq!(request.max_tokens, Some(1000));
        assert!(request.prompt.ends_with("User: halo\nAssistant:"));
    }

    #[tokio::test]
    async fn named_doctor_puts_schedule_in_prompt() {
        let provider = Arc::new(ScriptedProvider::replies(&["Jadwal beliau Senin dan Rabu."]));
        let mut engine = engine(provider.clone());

        engine.handle_turn("Dr. Rizki Pratama").await;

        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("[INFORMASI DOKTER TERKAIT]"));
        assert!(prompt.contains("Spesialisasi: Bedah Umum"));
        assert!(prompt.contains("Jadwal: Senin: 09:00-13:00, Rabu: 14:00-18:00"));
    }

    #[tokio::test]
    async fn provider_failure_returns_apology_and_keeps_memory() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("pertama".into()),
            Err(network_error()),
        ]));
        let mut engine = engine(provider);

        engine.handle_turn("halo").await;
        let before = engine.memory().len();
        let turn = engine.handle_turn("halo lagi").await;

        assert!(turn.reply.starts_with("Maaf, terjadi kesalahan: "));
        assert!(turn.reply.contains("connection refused"));
        assert!(turn.reply.ends_with("Silakan coba lagi."));
        assert_eq!(engine.memory().len(), before);
    }

    #[tokio::test]
    async fn recommendations_come_even_when_completion_fails() {
        let provider = Arc::new(ScriptedProvider::failing(network_error()));
        let mut engine = engine(provider);

        let turn = engine.handle_turn("saya demam dan batuk").await;

        assert!(turn.reply.starts_with("Maaf"));
        // The bundled catalog has no internist at RS Siloam.
        assert_eq!(turn.recommendations, vec![FALLBACK_RECOMMENDATION]);
    }

    #[tokio::test]
    async fn symptomatic_turn_with_available_doctor() {
        let provider = Arc::new(ScriptedProvider::replies(&["Sebaiknya periksa ke dokter kulit."]));
        let mut engine = engine(provider);

        let turn = engine.handle_turn("kulit saya gatal dan sakit").await;

        assert_eq!(
            turn.recommendations,
            vec!["💡 Rekomendasi: Dr. Indah Permata, Sp.KK (Kulit dan Kelamin) di RS Siloam"]
        );
    }

    #[tokio::test]
    async fn custom_detector_replaces_keywords() {
        let provider = Arc::new(ScriptedProvider::replies(&["ok", "ok"]));
        let mut engine = engine(provider).with_symptom_detector(|_: &str| false);

        let turn = engine.handle_turn("saya demam").await;
        assert!(turn.recommendations.is_empty());
    }

    #[tokio::test]
    async fn recommendations_disabled() {
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let settings = EngineSettings {
            enable_recommendations: false,
            ..EngineSettings::default()
        };
        let mut engine = engine_with(provider, settings);

        assert!(engine.handle_turn("saya demam").await.recommendations.is_empty());
    }

    #[tokio::test]
    async fn twelve_turns_keep_ten_and_window_five() {
        let replies: Vec<String> = (1..=12).map(|i| format!("jawaban {i}")).collect();
        let refs: Vec<&str> = replies.iter().map(String::as_str).collect();
        let provider = Arc::new(ScriptedProvider::replies(&refs));
        let mut engine = engine(provider.clone());

        for i in 1..=12 {
            engine.handle_turn(&format!("pertanyaan {i}")).await;
        }

        assert_eq!(engine.memory().len(), 10);
        assert_eq!(engine.memory().turns()[0].user(), "pertanyaan 3");
        assert_eq!(engine.memory().turns()[9].user(), "pertanyaan 12");

        let last_prompt = &provider.prompts()[11];
        for i in 7..=11 {
            assert!(last_prompt.contains(&format!("User: pertanyaan {i}\nAssistant: jawaban {i}")));
        }
        for i in 1..=6 {
            assert!(!last_prompt.contains(&format!("Assistant: jawaban {i}\n")));
        }
        assert!(last_prompt.ends_with("User: pertanyaan 12\nAssistant:"));
    }

    #[tokio::test]
    async fn clear_history_empties_prompt_history() {
        let provider = Arc::new(ScriptedProvider::replies(&["satu", "dua"]));
        let mut engine = engine(provider.clone());

        engine.handle_turn("halo").await;
        engine.clear_history();
        assert!(engine.memory().is_empty());

        engine.handle_turn("halo lagi").await;
        assert!(!provider.prompts()[1].contains("[RIWAYAT PERCAKAPAN]"));
    }

    #[tokio::test]
    async fn disabled_memory_never_records() {
        let provider = Arc::new(ScriptedProvider::replies(&["a", "b"]));
        let settings = EngineSettings {
            enable_memory: false,
            ..EngineSettings::default()
        };
        let mut engine = engine_with(provider.clone(), settings);

        engine.handle_turn("satu").await;
        engine.handle_turn("dua").await;

        assert!(engine.memory().is_empty());
        assert!(!provider.prompts()[1].contains("[RIWAYAT PERCAKAPAN]"));
    }

    #[tokio::test]
    async fn set_temperature_rebinds_requests() {
        let provider = Arc::new(ScriptedProvider::replies(&["ok"]));
        let mut engine = engine(provider.clone());

        engine.set_temperature(0.2).unwrap();
        assert!(engine.set_temperature(1.5).is_err());
        assert!((engine.binding().temperature() - 0.2).abs() < f32::EPSILON);

        engine.handle_turn("halo").await;
        let request = provider.last_request().unwrap();
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn preview_matches_persona_settings() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let settings = EngineSettings {
            persona: Persona::new(Style::Formal, "kesehatan"),
            ..EngineSettings::default()
        };
        let engine = engine_with(provider.clone(), settings);

        let prompt = engine.preview_prompt("saya mau ke dokter kulit");
        assert!(prompt.contains("Gaya komunikasi: formal"));
        assert!(prompt.contains("Dokter: Dr. Indah Permata, Sp.KK"));
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn unknown_recommendation_facility_is_rejected() {
        let provider = Arc::new(ScriptedProvider::replies(&[]));
        let binding = CompletionBinding::new(provider, "m", 0.7, 1000).unwrap();
        let settings = EngineSettings {
            recommendation_facility: "RS Antah Berantah".into(),
            ..EngineSettings::default()
        };

        let result = DialogueEngine::new(builtin(), binding, settings, ConversationMemory::default());
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn binding_validates_settings() {
        let provider: Arc<dyn Provider> = Arc::new(ScriptedProvider::replies(&[]));
        assert!(CompletionBinding::new(provider.clone(), "m", -0.1, 1000).is_err());
        assert!(CompletionBinding::new(provider.clone(), "m", 0.7, 0).is_err());
        assert!(CompletionBinding::new(provider, "m", 1.0, 1).is_ok());
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let a = engine(Arc::new(ScriptedProvider::replies(&[])));
        let b = engine(Arc::new(ScriptedProvider::replies(&[])));
        assert_ne!(a.session_id(), b.session_id());
    }
}
