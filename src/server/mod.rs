//! HTTP surface: the structured recipe endpoint and the WhatsApp webhook.

pub mod generate;
pub mod whatsapp;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use log::{info, warn};
use serde_json::json;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::SetupError;
use crate::messaging::{Messenger, TwilioMessenger};
use crate::model::GenerationFailure;
use crate::pipelines::RecipePipeline;
use crate::providers::ProviderFactory;

pub const GENERATE_PATH: &str = "/api/generate-recipes";
pub const WHATSAPP_PATH: &str = "/api/whatsapp";

// room for multipart boundaries and headers around the image itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared, immutable state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RecipePipeline>,
    pub messenger: Option<Arc<dyn Messenger>>,
    /// WhatsApp sender address replies go out from
    pub whatsapp_from: Option<String>,
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: RecipePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            messenger: None,
            whatsapp_from: None,
            max_image_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>, from: impl Into<String>) -> Self {
        self.messenger = Some(messenger);
        self.whatsapp_from = Some(from.into());
        self
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    /// Build every client once from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, SetupError> {
        let client = ProviderFactory::create(&config.completion)?;
        info!("Using completion provider '{}'", client.provider_name());

        let pipeline = RecipePipeline::from_config(client, &config.completion);
        let state = Self::new(pipeline).with_max_image_bytes(config.server.max_image_bytes);

        let messaging = config.messaging.clone().with_env_fallback();
        match (TwilioMessenger::new(&messaging), messaging.whatsapp_from) {
            (Ok(messenger), Some(from)) => Ok(state.with_messenger(Arc::new(messenger), from)),
            (Err(e), _) => {
                warn!("WhatsApp replies disabled: {}", e);
                Ok(state)
            }
            (Ok(_), None) => {
                warn!("WhatsApp replies disabled: TWILIO_WHATSAPP_NUMBER not found in config or environment");
                Ok(state)
            }
        }
    }
}

/// Returns the [`Router`] of this application.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_image_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route(GENERATE_PATH, post(generate::generate_recipes))
        .route(
            WHATSAPP_PATH,
            post(whatsapp::receive_message).get(whatsapp::webhook_status),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind the configured address and serve until the process stops
pub async fn serve(config: &AppConfig) -> Result<(), SetupError> {
    let state = AppState::from_config(config)?;
    let app = router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// JSON error responses of the structured endpoint
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    GenerationFailed,
}

impl From<GenerationFailure> for ApiError {
    fn from(_: GenerationFailure) -> Self {
        ApiError::GenerationFailed
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::GenerationFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GenerationFailure::USER_MESSAGE.to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
