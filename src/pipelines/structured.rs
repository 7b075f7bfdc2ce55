use log::warn;

use super::RecipePipeline;
use crate::model::{GenerationFailure, ImageInput, OutputMode, Recipe};
use crate::parser;

/// Generate exactly three recipes for an image.
///
/// Every stage failure collapses into one [`GenerationFailure`]; the stage
/// that failed survives only as `kind`, for logs.
pub async fn process(
    pipeline: &RecipePipeline,
    image: &ImageInput,
) -> Result<[Recipe; 3], GenerationFailure> {
    let outcome = match pipeline.complete(image, OutputMode::Structured).await {
        Ok(raw) => parser::parse(&raw).map_err(|e| {
            warn!("Failed to parse recipes from: {}", raw);
            e
        }),
        Err(e) => Err(e),
    };

    outcome.map_err(|e| {
        let failure = GenerationFailure::from(e);
        warn!(
            "Recipe generation failed [{}]: {}",
            failure.kind, failure.message
        );
        failure
    })
}
