use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErrorKind, PipelineError};

/// A single recipe suggestion. Any field the model omitted is left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: String,
    pub servings: String,
}

/// The photo to analyse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Uploaded bytes with their declared media type
    Inline { bytes: Vec<u8>, media_type: String },
    /// A URL the completion service can fetch itself
    Remote { url: String },
}

impl ImageInput {
    pub fn inline(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        ImageInput::Inline {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        ImageInput::Remote { url: url.into() }
    }
}

/// Shape of the answer the caller wants back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Three recipes as JSON records (web flow)
    #[default]
    Structured,
    /// One chat-sized message (messaging flow)
    FreeText,
}

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub image: ImageInput,
    pub mode: OutputMode,
}

impl PipelineRequest {
    pub fn new(image: ImageInput, mode: OutputMode) -> Self {
        Self { image, mode }
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub enum PipelineResult {
    Recipes([Recipe; 3]),
    Message(String),
    Failed(GenerationFailure),
}

/// Generic structured-flow failure. `kind` records which stage gave up;
/// callers only ever show [`GenerationFailure::USER_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl GenerationFailure {
    pub const USER_MESSAGE: &'static str = "Failed to generate recipes";
}

impl From<PipelineError> for GenerationFailure {
    fn from(err: PipelineError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::USER_MESSAGE)
    }
}
