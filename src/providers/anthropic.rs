use crate::config::CompletionConfig;
use crate::error::{PipelineError, SetupError};
use crate::prompt::{CompletionRequest, ContentPart, ImagePart};
use crate::providers::{check_status, http_client, non_empty, CompletionClient, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl AnthropicProvider {
    /// Model used when the configuration names none
    pub const DEFAULT_MODEL: &'static str = "claude-sonnet-4-5";

    /// Create a new Anthropic provider from configuration
    pub fn new(config: &CompletionConfig) -> Result<Self, SetupError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or(SetupError::MissingCredential("ANTHROPIC_API_KEY"))?;

        Ok(AnthropicProvider {
            client: http_client(config.timeout())?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: http_client(DEFAULT_TIMEOUT).unwrap_or_else(|_| Client::new()),
            api_key,
            base_url,
            model,
            temperature: 0.7,
        }
    }

    /// Claude reads images best when they come before the question
    fn message_content(request: &CompletionRequest) -> Vec<Value> {
        let mut blocks: Vec<Value> = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => json!({"type": "text", "text": text}),
                ContentPart::Image(ImagePart::Base64 { media_type, data }) => json!({
                    "type": "image",
                    "source": {"type": "base64", "media_type": media_type, "data": data}
                }),
                ContentPart::Image(ImagePart::Url(url)) => json!({
                    "type": "image",
                    "source": {"type": "url", "url": url}
                }),
            })
            .collect();
        blocks.sort_by_key(|block| block["type"] != "image");
        blocks
    }
}

#[async_trait]
impl CompletionClient for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, PipelineError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": request.max_tokens,
                "temperature": self.temperature,
                "messages": [
                    {
                        "role": "user",
                        "content": Self::message_content(request)
                    }
                ]
            }))
            .send()
            .await?;

        let response = check_status("Anthropic", response).await?;
        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let text = response_body["content"]
            .as_array()
            .and_then(|blocks| blocks.iter().find(|b| b["type"] == "text"))
            .and_then(|block| block["text"].as_str());

        non_empty(text)
    }
}
