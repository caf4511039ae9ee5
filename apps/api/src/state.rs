use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no upstream credential is configured. Every relay request
    /// then fails with a configuration error instead of reaching the upstream.
    pub llm: Option<LlmClient>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let llm = config
            .gemini_api_key
            .as_ref()
            .map(|key| LlmClient::new(key.clone(), config.gemini_api_base.clone()));

        Self { llm }
    }
}
