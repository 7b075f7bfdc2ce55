use std::fmt;

use thiserror::Error;

/// Errors that can occur while turning an image into recipes
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image payload was empty or the URL could not be used
    #[error("Invalid image input: {0}")]
    InvalidImageInput(String),

    /// Completion service could not be reached or answered with an error status
    #[error("Completion service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Completion service did not answer before the deadline
    #[error("Completion service timed out")]
    UpstreamTimeout,

    /// Completion service answered without any text
    #[error("Completion service returned no content")]
    UpstreamEmpty,

    /// Model output could not be read as a JSON array of recipes
    #[error("Failed to parse recipe data: {0}")]
    MalformedRecipeData(String),

    /// Model output held fewer than three recipes
    #[error("Expected 3 recipes, received {found}")]
    InsufficientRecipes { found: usize },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidImageInput(_) => ErrorKind::InvalidImageInput,
            PipelineError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            PipelineError::UpstreamTimeout => ErrorKind::UpstreamTimeout,
            PipelineError::UpstreamEmpty => ErrorKind::UpstreamEmpty,
            PipelineError::MalformedRecipeData(_) => ErrorKind::MalformedRecipeData,
            PipelineError::InsufficientRecipes { .. } => ErrorKind::InsufficientRecipes,
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PipelineError::UpstreamTimeout
        } else {
            PipelineError::UpstreamUnavailable(err.to_string())
        }
    }
}

/// Stage-independent classification of a [`PipelineError`], kept for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidImageInput,
    UpstreamUnavailable,
    UpstreamTimeout,
    UpstreamEmpty,
    MalformedRecipeData,
    InsufficientRecipes,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidImageInput => "InvalidImageInput",
            ErrorKind::UpstreamUnavailable => "UpstreamUnavailable",
            ErrorKind::UpstreamTimeout => "UpstreamTimeout",
            ErrorKind::UpstreamEmpty => "UpstreamEmpty",
            ErrorKind::MalformedRecipeData => "MalformedRecipeData",
            ErrorKind::InsufficientRecipes => "InsufficientRecipes",
        };
        f.write_str(name)
    }
}

/// Errors from the messaging-delivery service
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Failed to reach messaging service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Messaging service error ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Unexpected messaging response: {0}")]
    InvalidResponse(String),
}

/// Errors raised while wiring the application together
#[derive(Error, Debug)]
pub enum SetupError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Credential absent from both config and environment
    #[error("{0} not found in config or environment")]
    MissingCredential(&'static str),

    /// Failed to build an HTTP client
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            PipelineError::InsufficientRecipes { found: 2 }.kind(),
            ErrorKind::InsufficientRecipes
        );
        assert_eq!(PipelineError::UpstreamEmpty.kind(), ErrorKind::UpstreamEmpty);
        assert_eq!(
            PipelineError::MalformedRecipeData("eof".to_string()).kind(),
            ErrorKind::MalformedRecipeData
        );
    }

    #[test]
    fn test_error_messages() {
        let err = PipelineError::InsufficientRecipes { found: 2 };
        assert_eq!(err.to_string(), "Expected 3 recipes, received 2");
        assert_eq!(ErrorKind::UpstreamTimeout.to_string(), "UpstreamTimeout");
    }
}
