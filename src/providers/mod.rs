mod anthropic;
mod factory;
mod open_ai;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::PipelineError;
use crate::prompt::CompletionRequest;

/// Client deadline for providers built without a configuration
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Unified trait for multimodal completion services
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Send one request and return the first text choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError>;
}

/// HTTP client whose requests give up after `timeout`
pub(crate) fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Reject absent or whitespace-only completions
pub(crate) fn non_empty(content: Option<&str>) -> Result<String, PipelineError> {
    match content {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(PipelineError::UpstreamEmpty),
    }
}

/// Turn a non-2xx response into [`PipelineError::UpstreamUnavailable`]
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, PipelineError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(PipelineError::UpstreamUnavailable(format!(
        "{} API error ({}): {}",
        provider, status, error_text
    )))
}

/// Listener that accepts connections and never answers them
#[cfg(test)]
pub(crate) async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}
