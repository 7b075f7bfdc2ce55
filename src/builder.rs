use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CompletionConfig;
use crate::error::SetupError;
use crate::model::{ImageInput, OutputMode, PipelineRequest, PipelineResult};
use crate::pipelines::RecipePipeline;
use crate::prompt::PromptBuilder;
use crate::providers::ProviderFactory;

/// Where the photo comes from
#[derive(Debug, Clone)]
enum ImageSource {
    /// Read from disk when the builder runs
    File(PathBuf),
    Input(ImageInput),
}

/// Completion provider selection
#[derive(Debug, Clone)]
pub enum Provider {
    OpenAI,
    Anthropic,
}

impl Provider {
    /// Convert to provider name string used by the factory
    fn as_str(&self) -> &str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }
}

/// Builder for one-off recipe generation without running the server
#[derive(Debug, Default)]
pub struct RecipeGeneratorBuilder {
    source: Option<ImageSource>,
    mode: OutputMode,
    provider: Option<Provider>,
    timeout: Option<Duration>,
    api_key: Option<String>,
    model: Option<String>,
    config: Option<CompletionConfig>,
}

impl RecipeGeneratorBuilder {
    /// Use a photo from disk; the media type is guessed from the extension
    ///
    /// # Example
    /// ```
    /// use pantry_chef::RecipeGenerator;
    ///
    /// let builder = RecipeGenerator::builder()
    ///     .image_file("/path/to/fridge.jpg");
    /// ```
    pub fn image_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(ImageSource::File(path.into()));
        self
    }

    /// Use photo bytes already in memory
    pub fn image_bytes(mut self, bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        self.source = Some(ImageSource::Input(ImageInput::inline(bytes, media_type)));
        self
    }

    /// Use a photo the completion service can download itself
    ///
    /// # Example
    /// ```
    /// use pantry_chef::RecipeGenerator;
    ///
    /// let builder = RecipeGenerator::builder()
    ///     .image_url("https://example.com/leftovers.jpg")
    ///     .free_text();
    /// ```
    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(ImageSource::Input(ImageInput::remote(url)));
        self
    }

    /// Ask for one chat-style message instead of three JSON recipes
    pub fn free_text(mut self) -> Self {
        self.mode = OutputMode::FreeText;
        self
    }

    /// Set a custom completion provider
    ///
    /// # Example
    /// ```
    /// use pantry_chef::{Provider, RecipeGenerator};
    ///
    /// let builder = RecipeGenerator::builder()
    ///     .image_file("fridge.png")
    ///     .provider(Provider::Anthropic);
    /// ```
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the deadline for the completion call
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the API key instead of relying on environment variables
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Start from a loaded configuration; individual setters still win
    pub fn config(mut self, config: CompletionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Resolve the completion settings this builder would run with
    fn completion_config(&self) -> CompletionConfig {
        let mut config = self.config.clone().unwrap_or_default();
        if let Some(provider) = &self.provider {
            config.provider = provider.as_str().to_string();
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(timeout) = self.timeout {
            // Rounded up so the client never gives up before the pipeline deadline
            config.timeout_secs =
                (timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)).max(1);
        }
        config
    }

    /// Build the pipeline and run it once
    ///
    /// # Errors
    /// Returns `SetupError` if no image was given, the file cannot be read,
    /// or the provider cannot be created. Generation failures are reported
    /// inside the returned [`PipelineResult`].
    ///
    /// # Example
    /// ```no_run
    /// # use pantry_chef::RecipeGenerator;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let result = RecipeGenerator::builder()
    ///     .image_file("fridge.jpg")
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<PipelineResult, SetupError> {
        let config = self.completion_config();

        let image = match self.source {
            None => {
                return Err(SetupError::BuilderError(
                    "No image specified. Use .image_file(), .image_bytes() or .image_url()"
                        .to_string(),
                ))
            }
            Some(ImageSource::File(path)) => {
                let bytes = tokio::fs::read(&path).await?;
                ImageInput::inline(bytes, media_type_for(&path))
            }
            Some(ImageSource::Input(image)) => image,
        };

        let client = ProviderFactory::create(&config)?;
        let pipeline = RecipePipeline::new(
            client,
            PromptBuilder::from_config(&config),
            self.timeout.unwrap_or_else(|| config.timeout()),
        );

        Ok(pipeline.run(PipelineRequest::new(image, self.mode)).await)
    }
}

/// Media type from a file extension, `image/jpeg` when unknown
pub fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

/// Main entry point for the builder API
pub struct RecipeGenerator;

impl RecipeGenerator {
    /// Creates a new builder for generating recipes
    pub fn builder() -> RecipeGeneratorBuilder {
        RecipeGeneratorBuilder::default()
    }
}
