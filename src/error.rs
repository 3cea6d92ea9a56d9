//! Unified error type for imagegrid.

use thiserror::Error;

/// Errors that can occur while talking to the generation service or the host.
#[derive(Debug, Error)]
pub enum ImageError {
    /// An API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image decoding or format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// The speech capability failed to start.
    #[error("Dictation error: {0}")]
    Dictation(String),

    /// A workflow settled with an error shown to the user.
    #[error("{0}")]
    Workflow(String),

    /// No API key configured for the provider.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The provider name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },
}

impl ImageError {
    /// The text shown to the user for this error, if it carries any.
    ///
    /// Replayed and upstream errors may arrive with an empty body; those
    /// yield `None` so the caller can fall back to a localized message.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        let text = match self {
            Self::Api { message, .. } => message.trim().to_string(),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}
