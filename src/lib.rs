pub mod builder;
pub mod config;
pub mod error;
pub mod messaging;
pub mod model;
pub mod parser;
pub mod pipelines;
pub mod prompt;
pub mod providers;
pub mod server;

pub use builder::{Provider, RecipeGenerator, RecipeGeneratorBuilder};
pub use config::AppConfig;
pub use error::{ErrorKind, MessagingError, PipelineError, SetupError};
pub use model::{
    GenerationFailure, ImageInput, OutputMode, PipelineRequest, PipelineResult, Recipe,
};
pub use pipelines::RecipePipeline;
