//! Configuration loading, validation, and management for CareBot.
//!
//! Loads configuration from `~/.carebot/config.toml` with environment
//! variable overrides. Everything is read once and validated at startup;
//! nothing here is hot-reloaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.carebot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion backend ("gemini", "openai", "openrouter", "ollama")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name passed to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the backend base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Sampling temperature (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max output tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Facility catalog file. The bundled catalog is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_path: Option<PathBuf>,

    /// Chatbot behaviour
    #[serde(default)]
    pub chatbot: ChatbotConfig,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("knowledge_path", &self.knowledge_path)
            .field("chatbot", &self.chatbot)
            .finish()
    }
}

/// Conversational style of the persona.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    #[serde(alias = "santai")]
    Casual,
    Formal,
}

impl Style {
    /// The label used inside the persona instructions.
    pub fn label(&self) -> &'static str {
        match self {
            Style::Casual => "santai",
            Style::Formal => "formal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotConfig {
    #[serde(default)]
    pub style: Style,

    /// Domain label rendered into the persona
    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default = "default_true")]
    pub enable_memory: bool,

    #[serde(default = "default_true")]
    pub enable_recommendations: bool,

    /// The only facility searched when suggesting doctors
    #[serde(default = "default_recommendation_facility")]
    pub recommendation_facility: String,
}

fn default_domain() -> String {
    "kesehatan".into()
}
fn default_recommendation_facility() -> String {
    "RS Siloam".into()
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            style: Style::default(),
            domain: default_domain(),
            enable_memory: true,
            enable_recommendations: true,
            recommendation_facility: default_recommendation_facility(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.carebot/config.toml).
    ///
    /// Also checks environment variables:
    /// - `CAREBOT_API_KEY` (highest priority), `GEMINI_API_KEY`, `OPENAI_API_KEY`
    /// - `CAREBOT_PROVIDER`, `CAREBOT_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("CAREBOT_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none() {
            self.api_key = lookup("GEMINI_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("CAREBOT_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = lookup("CAREBOT_MODEL") {
            self.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".carebot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_temperature(self.temperature)?;

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        if self.chatbot.domain.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chatbot.domain must not be empty".into(),
            ));
        }

        if self.chatbot.enable_recommendations
            && self.chatbot.recommendation_facility.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "chatbot.recommendation_facility must be set when recommendations are enabled"
                    .into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Temperature must stay within the 0.0 - 1.0 range the persona is tuned for.
pub fn validate_temperature(temperature: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&temperature) {
        return Err(ConfigError::ValidationError(format!(
            "temperature must be between 0.0 and 1.0 (got {temperature})"
        )));
    }
    Ok(())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            api_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            knowledge_path: None,
            chatbot: ChatbotConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No API key configured for provider '{0}'")]
    MissingApiKey(String),
}
