//! Shared test doubles for engine tests.

use carebot_core::error::ProviderError;
use carebot_core::provider::{Provider, ProviderRequest, ProviderResponse};
use std::sync::Mutex;

/// A mock provider that plays back scripted outcomes and records every
/// request it receives.
///
/// Each call to `complete` returns the next outcome in the script.
/// Panics if more calls are made than outcomes provided.
pub struct ScriptedProvider {
    script: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Successful replies, one per call.
    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    /// A backend that fails once with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let script = self.script.lock().unwrap();
        let index = requests.len();

        if index >= script.len() {
            panic!(
                "ScriptedProvider: no more outcomes (call #{}, have {})",
                index,
                script.len()
            );
        }

        let model = request.model.clone();
        requests.push(request);
        script[index]
            .clone()
            .map(|text| ProviderResponse::text(text, model))
    }
}

pub fn network_error() -> ProviderError {
    ProviderError::Network("connection refused".into())
}
