//! Agent Module
//!
//! Language-model backends used for pharmacokinetic parameter extraction.

mod provider;

pub use provider::{LLMProvider, OllamaProvider, OpenAICompatibleProvider, MAX_RESPONSE_TOKENS};

use std::sync::Arc;

use tracing::warn;

use crate::config::LlmConfig;

/// Build the configured provider, or `None` when the model is disabled.
pub fn build_provider(config: &LlmConfig) -> Option<Arc<dyn LLMProvider>> {
    if !config.enabled {
        return None;
    }
    let provider: Arc<dyn LLMProvider> = match config.provider_url {
        Some(ref url) => Arc::new(
            OpenAICompatibleProvider::new(url.clone(), config.api_key.clone())
                .with_temperature(config.temperature),
        ),
        None => match OllamaProvider::from_host(&config.ollama_host, config.ollama_port) {
            Ok(provider) => Arc::new(provider.with_temperature(config.temperature)),
            Err(e) => {
                warn!("{:#}; literature defaults will be used", e);
                return None;
            }
        },
    };
    Some(provider)
}
