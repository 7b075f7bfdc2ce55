use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::{Form, Json};
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::model::{ImageInput, OutputMode, PipelineRequest, PipelineResult};

pub const ACKNOWLEDGEMENT: &str = "OK";

pub const PROGRESS_BANNER: &str = "🍳 *AI Recipe Generator*\n\nAnalyzing your ingredients...\n\n";

pub const WELCOME_MESSAGE: &str = "👋 Welcome to AI Recipe Generator!

📸 Send me a photo of your leftover ingredients (vegetables, meat, or any food items), and I'll generate 3 creative recipes for you!

Just snap a picture and send it here. No text needed!";

/// Fields of a Twilio incoming-message webhook that matter here
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncomingMessage {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "NumMedia")]
    pub num_media: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "MediaUrl0")]
    pub media_url: Option<String>,
    #[serde(rename = "MediaContentType0")]
    pub media_content_type: Option<String>,
}

impl IncomingMessage {
    pub fn attachment_count(&self) -> u32 {
        self.num_media.trim().parse().unwrap_or(0)
    }
}

/// `GET /api/whatsapp`: liveness check for webhook verification
pub async fn webhook_status() -> Json<Value> {
    Json(json!({ "status": "WhatsApp webhook is active" }))
}

/// `POST /api/whatsapp`: reply out of band, always acknowledge with 200
pub async fn receive_message(
    State(state): State<AppState>,
    form: Result<Form<IncomingMessage>, FormRejection>,
) -> &'static str {
    let message = match form {
        Ok(Form(message)) => message,
        Err(e) => {
            warn!("Ignoring unreadable webhook payload: {}", e);
            return ACKNOWLEDGEMENT;
        }
    };

    info!(
        "Received WhatsApp message from {} with {} attachment(s)",
        message.from,
        message.attachment_count()
    );
    debug!("Message body: {:?}", message.body);

    // Reply after acknowledging: Twilio abandons webhooks slower than 15s
    tokio::spawn(async move {
        let reply = compose_reply(&state, &message).await;
        send_reply(&state, &message.from, &reply).await;
    });

    ACKNOWLEDGEMENT
}

async fn compose_reply(state: &AppState, message: &IncomingMessage) -> String {
    if message.attachment_count() == 0 {
        return WELCOME_MESSAGE.to_string();
    }

    let media_url = message.media_url.clone().unwrap_or_default();
    info!(
        "Processing image {} ({})",
        media_url,
        message.media_content_type.as_deref().unwrap_or("unknown type")
    );

    let request = PipelineRequest::new(ImageInput::remote(media_url), OutputMode::FreeText);
    let generated = match state.pipeline.run(request).await {
        PipelineResult::Message(text) => text,
        other => {
            error!("Unexpected result from chat flow: {:?}", other);
            crate::pipelines::free_text::APOLOGY.to_string()
        }
    };

    format!("{}{}", PROGRESS_BANNER, generated)
}

async fn send_reply(state: &AppState, to: &str, body: &str) {
    let (Some(messenger), Some(from)) = (&state.messenger, &state.whatsapp_from) else {
        warn!("Messaging is not configured; reply to {} dropped", to);
        return;
    };

    if to.trim().is_empty() {
        warn!("Webhook payload had no sender; reply dropped");
        return;
    }

    match messenger.deliver(to, from, body).await {
        Ok(receipt) => info!("Reply {} queued for {}", receipt.id, to),
        Err(e) => error!("Error sending WhatsApp reply to {}: {}", to, e),
    }
}
