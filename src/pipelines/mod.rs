pub mod free_text;
pub mod structured;

use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CompletionConfig;
use crate::error::PipelineError;
use crate::model::{ImageInput, OutputMode, PipelineRequest, PipelineResult};
use crate::prompt::PromptBuilder;
use crate::providers::CompletionClient;

/// Composes prompt building, the completion call and parsing.
///
/// Holds no per-request state, so one instance is shared by every handler.
/// Dropping a `run` future (for example when an HTTP caller disconnects)
/// drops the in-flight completion request with it.
pub struct RecipePipeline {
    client: Arc<dyn CompletionClient>,
    prompts: PromptBuilder,
    deadline: Duration,
}

impl RecipePipeline {
    pub fn new(client: Arc<dyn CompletionClient>, prompts: PromptBuilder, deadline: Duration) -> Self {
        Self {
            client,
            prompts,
            deadline,
        }
    }

    pub fn from_config(client: Arc<dyn CompletionClient>, config: &CompletionConfig) -> Self {
        Self::new(client, PromptBuilder::from_config(config), config.timeout())
    }

    /// Run one request through the flow its mode selects
    pub async fn run(&self, request: PipelineRequest) -> PipelineResult {
        match request.mode {
            OutputMode::Structured => match structured::process(self, &request.image).await {
                Ok(recipes) => PipelineResult::Recipes(recipes),
                Err(failure) => PipelineResult::Failed(failure),
            },
            OutputMode::FreeText => {
                PipelineResult::Message(free_text::process(self, &request.image).await)
            }
        }
    }

    /// Build the prompt and make the single completion call under the deadline
    pub(crate) async fn complete(
        &self,
        image: &ImageInput,
        mode: OutputMode,
    ) -> Result<String, PipelineError> {
        let request = self.prompts.build(image, mode)?;

        info!(
            "Requesting {:?} completion from {} (max_tokens={})",
            mode,
            self.client.provider_name(),
            request.max_tokens
        );

        let text = tokio::time::timeout(self.deadline, self.client.complete(&request))
            .await
            .map_err(|_| PipelineError::UpstreamTimeout)??;

        debug!("Completion returned {} characters", text.len());
        Ok(text)
    }
}
