use crate::config::CompletionConfig;
use crate::error::SetupError;
use crate::providers::{AnthropicProvider, CompletionClient, OpenAIProvider};
use std::sync::Arc;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the configured provider, built once and shared across requests
    pub fn create(config: &CompletionConfig) -> Result<Arc<dyn CompletionClient>, SetupError> {
        match config.provider.as_str() {
            "openai" => Ok(Arc::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Arc::new(AnthropicProvider::new(config)?)),
            other => Err(SetupError::UnknownProvider(format!(
                "{} (expected one of: {})",
                other,
                Self::available_providers().join(", ")
            ))),
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic"]
    }
}
