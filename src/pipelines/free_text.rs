use log::warn;

use super::RecipePipeline;
use crate::error::PipelineError;
use crate::model::{ImageInput, OutputMode};

/// Sent when the model answered with nothing
pub const EMPTY_REPLY: &str = "Could not generate recipes";

/// Sent for every other failure
pub const APOLOGY: &str = "Sorry, I encountered an error generating recipes. Please try again.";

/// Generate a chat-sized recipe message for an image.
///
/// Never fails: a conversation gets a fallback message rather than silence.
pub async fn process(pipeline: &RecipePipeline, image: &ImageInput) -> String {
    match pipeline.complete(image, OutputMode::FreeText).await {
        Ok(text) => text,
        Err(PipelineError::UpstreamEmpty) => {
            warn!("Completion for chat reply was empty");
            EMPTY_REPLY.to_string()
        }
        Err(e) => {
            warn!("Error generating chat reply [{}]: {}", e.kind(), e);
            APOLOGY.to_string()
        }
    }
}
