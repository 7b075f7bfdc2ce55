use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::Url;

use crate::config::CompletionConfig;
use crate::error::PipelineError;
use crate::model::{ImageInput, OutputMode};

/// Instructions for the three-recipe JSON answer.
///
/// Loaded from `prompts/structured.txt` at compile time so the wording can be
/// edited without dealing with Rust string syntax.
pub const STRUCTURED_PROMPT: &str = include_str!("prompts/structured.txt");

/// Instructions for the short chat message answer.
pub const FREE_TEXT_PROMPT: &str = include_str!("prompts/free_text.txt");

const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// One block of a multimodal user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(ImagePart),
}

/// Image block in the form the completion service receives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePart {
    Base64 { media_type: String, data: String },
    Url(String),
}

impl ImagePart {
    /// `data:` URL for inline images, the remote URL otherwise
    pub fn to_url(&self) -> String {
        match self {
            ImagePart::Base64 { media_type, data } => {
                format!("data:{};base64,{}", media_type, data)
            }
            ImagePart::Url(url) => url.clone(),
        }
    }
}

/// Provider-neutral completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub mode: OutputMode,
    pub parts: Vec<ContentPart>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn text(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            ContentPart::Text(text) => Some(text.as_str()),
            ContentPart::Image(_) => None,
        })
    }

    pub fn image(&self) -> Option<&ImagePart> {
        self.parts.iter().find_map(|part| match part {
            ContentPart::Image(image) => Some(image),
            ContentPart::Text(_) => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    structured_max_tokens: u32,
    free_text_max_tokens: u32,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(2000, 1500)
    }
}

impl PromptBuilder {
    pub fn new(structured_max_tokens: u32, free_text_max_tokens: u32) -> Self {
        Self {
            structured_max_tokens,
            free_text_max_tokens,
        }
    }

    pub fn from_config(config: &CompletionConfig) -> Self {
        Self::new(config.structured_max_tokens, config.free_text_max_tokens)
    }

    /// Assemble the instruction text and the image into one request.
    ///
    /// # Errors
    /// Returns [`PipelineError::InvalidImageInput`] if the inline payload is
    /// empty or the remote URL is not an absolute http(s) URL.
    pub fn build(
        &self,
        image: &ImageInput,
        mode: OutputMode,
    ) -> Result<CompletionRequest, PipelineError> {
        let (template, max_tokens) = match mode {
            OutputMode::Structured => (STRUCTURED_PROMPT, self.structured_max_tokens),
            OutputMode::FreeText => (FREE_TEXT_PROMPT, self.free_text_max_tokens),
        };

        Ok(CompletionRequest {
            mode,
            parts: vec![
                ContentPart::Text(template.trim_end().to_string()),
                ContentPart::Image(image_part(image)?),
            ],
            max_tokens,
        })
    }
}

fn image_part(image: &ImageInput) -> Result<ImagePart, PipelineError> {
    match image {
        ImageInput::Inline { bytes, media_type } => {
            if bytes.is_empty() {
                return Err(PipelineError::InvalidImageInput(
                    "image payload is empty".to_string(),
                ));
            }
            let media_type = match media_type.trim() {
                "" => DEFAULT_MEDIA_TYPE,
                declared => declared,
            };
            Ok(ImagePart::Base64 {
                media_type: media_type.to_string(),
                data: STANDARD.encode(bytes),
            })
        }
        ImageInput::Remote { url } => {
            let parsed = Url::parse(url.trim()).map_err(|e| {
                PipelineError::InvalidImageInput(format!("malformed image URL '{}': {}", url, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(PipelineError::InvalidImageInput(format!(
                    "unsupported image URL scheme '{}'",
                    parsed.scheme()
                )));
            }
            Ok(ImagePart::Url(parsed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_prompts_are_embedded() {
        assert!(STRUCTURED_PROMPT.contains("exactly 3"));
        assert!(STRUCTURED_PROMPT.contains("JSON array"));
        for field in ["\"name\"", "\"ingredients\"", "\"instructions\"", "\"cookingTime\"", "\"servings\""] {
            assert!(STRUCTURED_PROMPT.contains(field), "missing {field}");
        }
        assert!(STRUCTURED_PROMPT.contains("diverse"));

        assert!(FREE_TEXT_PROMPT.contains("3-4 steps"));
        assert!(FREE_TEXT_PROMPT.contains("WhatsApp"));
        assert!(!FREE_TEXT_PROMPT.contains("JSON"));
    }

    #[test]
    fn test_inline_image_is_base64_encoded() {
        let builder = PromptBuilder::default();
        let request = builder
            .build(&ImageInput::inline(b"fake png".to_vec(), "image/png"), OutputMode::Structured)
            .unwrap();

        assert_eq!(request.max_tokens, 2000);
        assert_eq!(request.parts.len(), 2);
        assert!(matches!(request.parts[0], ContentPart::Text(_)));
        assert_eq!(
            request.image().unwrap().to_url(),
            format!("data:image/png;base64,{}", STANDARD.encode(b"fake png"))
        );
    }

    #[test]
    fn test_missing_media_type_defaults_to_jpeg() {
        let request = PromptBuilder::default()
            .build(&ImageInput::inline(vec![0xFF, 0xD8], ""), OutputMode::Structured)
            .unwrap();

        match request.image().unwrap() {
            ImagePart::Base64 { media_type, .. } => assert_eq!(media_type, "image/jpeg"),
            other => panic!("expected inline image, got {:?}", other),
        }
    }

    #[test]
    fn test_free_text_uses_remote_url_and_smaller_budget() {
        let builder = PromptBuilder::new(2000, 1500);
        let request = builder
            .build(
                &ImageInput::remote("https://api.twilio.com/media/ME123"),
                OutputMode::FreeText,
            )
            .unwrap();

        assert_eq!(request.max_tokens, 1500);
        assert_eq!(request.text(), Some(FREE_TEXT_PROMPT.trim_end()));
        assert_eq!(
            request.image(),
            Some(&ImagePart::Url("https://api.twilio.com/media/ME123".to_string()))
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::default();
        let image = ImageInput::inline(b"abc".to_vec(), "image/webp");
        assert_eq!(
            builder.build(&image, OutputMode::Structured).unwrap(),
            builder.build(&image, OutputMode::Structured).unwrap()
        );
    }

    #[test]
    fn test_rejects_empty_payload() {
        let err = PromptBuilder::default()
            .build(&ImageInput::inline(Vec::new(), "image/png"), OutputMode::Structured)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidImageInput);
    }

    #[test]
    fn test_rejects_malformed_urls() {
        let builder = PromptBuilder::default();
        for url in ["", "not a url", "/relative/path.jpg", "ftp://example.com/a.jpg"] {
            let err = builder
                .build(&ImageInput::remote(url), OutputMode::FreeText)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidImageInput, "accepted {url:?}");
        }
    }
}
