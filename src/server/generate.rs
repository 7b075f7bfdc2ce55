use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use log::{info, warn};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::model::{ImageInput, OutputMode, PipelineRequest, PipelineResult, Recipe};

const IMAGE_FIELD: &str = "image";
const NO_IMAGE: &str = "No image provided";

#[derive(Debug, Serialize)]
pub struct RecipesResponse {
    pub recipes: [Recipe; 3],
}

/// `POST /api/generate-recipes`: multipart upload in, three recipes out
pub async fn generate_recipes(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecipesResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected non-multipart upload: {}", e);
        ApiError::BadRequest(NO_IMAGE.to_string())
    })?;

    let mut image: Option<ImageInput> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let media_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;

        if data.len() > state.max_image_bytes {
            return Err(ApiError::BadRequest(format!(
                "Image too large. Max size is {} bytes",
                state.max_image_bytes
            )));
        }

        // an empty file input is the browser's way of sending no image
        if !data.is_empty() {
            image = Some(ImageInput::inline(data.to_vec(), media_type));
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest(NO_IMAGE.to_string()))?;
    info!("Generating recipes for uploaded image");

    match state
        .pipeline
        .run(PipelineRequest::new(image, OutputMode::Structured))
        .await
    {
        PipelineResult::Recipes(recipes) => Ok(Json(RecipesResponse { recipes })),
        PipelineResult::Failed(failure) => Err(failure.into()),
        PipelineResult::Message(_) => Err(ApiError::GenerationFailed),
    }
}
