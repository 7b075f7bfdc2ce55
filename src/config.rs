use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted upload on the structured endpoint, in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

/// Configuration for the completion provider
#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    /// Provider name ("openai" or "anthropic")
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier (e.g., "gpt-4o"); unset picks the provider's default
    pub model: Option<String>,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Output budget for the three-recipe JSON answer
    #[serde(default = "default_structured_max_tokens")]
    pub structured_max_tokens: u32,
    /// Output budget for the chat message answer
    #[serde(default = "default_free_text_max_tokens")]
    pub free_text_max_tokens: u32,
    /// Deadline for one completion call, in seconds
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            structured_max_tokens: default_structured_max_tokens(),
            free_text_max_tokens: default_free_text_max_tokens(),
            timeout_secs: default_completion_timeout(),
        }
    }
}

/// Twilio credentials for WhatsApp replies. All optional: without them the
/// webhook still acknowledges but cannot reply.
#[derive(Debug, Deserialize, Clone)]
pub struct MessagingConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Sender address, e.g. "whatsapp:+14155238886"
    pub whatsapp_from: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_messaging_timeout")]
    pub timeout_secs: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            whatsapp_from: None,
            base_url: None,
            timeout_secs: default_messaging_timeout(),
        }
    }
}

impl MessagingConfig {
    /// Fill unset credentials from the variables Twilio documents
    pub fn with_env_fallback(mut self) -> Self {
        self.account_sid = self
            .account_sid
            .or_else(|| std::env::var("TWILIO_ACCOUNT_SID").ok());
        self.auth_token = self
            .auth_token
            .or_else(|| std::env::var("TWILIO_AUTH_TOKEN").ok());
        self.whatsapp_from = self
            .whatsapp_from
            .or_else(|| std::env::var("TWILIO_WHATSAPP_NUMBER").ok());
        self
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_image_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_structured_max_tokens() -> u32 {
    2000
}

fn default_free_text_max_tokens() -> u32 {
    1500
}

fn default_completion_timeout() -> u64 {
    60
}

fn default_messaging_timeout() -> u64 {
    15
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PANTRY_CHEF__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: PANTRY_CHEF__COMPLETION__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("PANTRY_CHEF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
