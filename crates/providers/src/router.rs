//! Provider selection: builds the configured completion backend.

use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;
use carebot_config::{AppConfig, ConfigError};
use carebot_core::provider::Provider;
use std::sync::Arc;
use tracing::info;

/// Build the completion backend named by `config.provider`.
///
/// Every backend except local ones (ollama, vllm, llama.cpp) needs an API key;
/// a missing key is a configuration error, reported before any turn runs.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let name = config.provider.trim().to_lowercase();
    let base_url = config.api_url.clone();

    let api_key = match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ if is_local(&name) => String::new(),
        _ => return Err(ConfigError::MissingApiKey(name)),
    };

    let provider: Arc<dyn Provider> = match name.as_str() {
        "gemini" | "google" => {
            let mut p = GeminiProvider::new(api_key);
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        "ollama" => Arc::new(OpenAiCompatProvider::ollama(base_url.as_deref())),
        other => {
            let url = match base_url {
                Some(url) => url,
                None => default_base_url(other).ok_or_else(|| {
                    ConfigError::ValidationError(format!(
                        "unknown provider '{other}': set api_url to use a custom endpoint"
                    ))
                })?,
            };
            Arc::new(OpenAiCompatProvider::new(other, url, api_key))
        }
    };

    info!(provider = provider.name(), model = %config.model, "Completion backend ready");
    Ok(provider)
}

fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1",
        "openai" => "https://api.openai.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.into())
}
