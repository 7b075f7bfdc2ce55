use crate::config::CompletionConfig;
use crate::error::{PipelineError, SetupError};
use crate::prompt::{CompletionRequest, ContentPart};
use crate::providers::{check_status, http_client, non_empty, CompletionClient, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAIProvider {
    /// Model used when the configuration names none
    pub const DEFAULT_MODEL: &'static str = "gpt-4o";

    /// Create a new OpenAI provider from configuration
    pub fn new(config: &CompletionConfig) -> Result<Self, SetupError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or(SetupError::MissingCredential("OPENAI_API_KEY"))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAIProvider {
            client: http_client(config.timeout())?,
            api_key,
            base_url,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: http_client(DEFAULT_TIMEOUT).unwrap_or_else(|_| Client::new()),
            api_key,
            base_url,
            model,
            temperature: 0.7,
        }
    }

    fn message_content(request: &CompletionRequest) -> Vec<Value> {
        request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => json!({"type": "text", "text": text}),
                ContentPart::Image(image) => json!({
                    "type": "image_url",
                    "image_url": {"url": image.to_url()}
                }),
            })
            .collect()
    }
}

#[async_trait]
impl CompletionClient for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "user", "content": Self::message_content(request)}
                ],
                "temperature": self.temperature,
                "max_tokens": request.max_tokens
            }))
            .send()
            .await?;

        let response = check_status("OpenAI", response).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        non_empty(response_body["choices"][0]["message"]["content"].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{ImageInput, OutputMode};
    use crate::prompt::PromptBuilder;
    use crate::providers::silent_server;
    use mockito::{Matcher, Server};

    fn request(mode: OutputMode) -> CompletionRequest {
        PromptBuilder::default()
            .build(&ImageInput::inline(b"jpeg bytes".to_vec(), "image/jpeg"), mode)
            .unwrap()
    }

    #[tokio::test]
    async fn test_complete() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer fake_api_key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o",
                "max_tokens": 2000,
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text"},
                        {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,anBlZyBieXRlcw=="}}
                    ]
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"content": "[{\"name\": \"Soup\"}]"}}]}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o".to_string(),
        );

        let result = provider.complete(&request(OutputMode::Structured)).await.unwrap();
        assert_eq!(result, r#"[{"name": "Soup"}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(503)
            .with_body(r#"{"error": "overloaded"}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o".to_string(),
        );

        let err = provider
            .complete(&request(OutputMode::FreeText))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.to_string().contains("503"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_empty_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"content": null}}]}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o".to_string(),
        );

        let err = provider
            .complete(&request(OutputMode::Structured))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamEmpty);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_sends_default_model_when_unset() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({"model": "gpt-4o"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"content": "ok"}}]}"#)
            .create_async()
            .await;

        let config = CompletionConfig {
            api_key: Some("fake_api_key".to_string()),
            base_url: Some(server.url()),
            ..Default::default()
        };
        let provider = OpenAIProvider::new(&config).unwrap();

        provider.complete(&request(OutputMode::FreeText)).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_client_timeout() {
        let config = CompletionConfig {
            api_key: Some("fake_api_key".to_string()),
            base_url: Some(silent_server().await),
            timeout_secs: 1,
            ..Default::default()
        };
        let provider = OpenAIProvider::new(&config).unwrap();

        let err = provider
            .complete(&request(OutputMode::Structured))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamTimeout);
    }

    #[test]
    fn test_provider_name() {
        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            DEFAULT_BASE_URL.to_string(),
            "gpt-4o".to_string(),
        );
        assert_eq!(provider.provider_name(), "openai");
    }
}
