//! Service gateway port for the remote image and prompt generation API.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// An opaque reference to one generated image, as a `data:` URI.
pub type ImageRef = String;

/// A request to generate images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// The resolved image model identifier (e.g., `"imagen-4.0-generate-001"`).
    pub model: String,
    /// The text prompt describing the desired images.
    pub prompt: String,
    /// Aspect ratio token (e.g., `"1:1"`, `"9:16"`).
    pub aspect_ratio: String,
    /// Number of images to generate.
    pub count: u32,
    /// MIME type requested from the service (e.g., `"image/jpeg"`).
    pub mime_type: String,
}

/// A request for one random image idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// The resolved text model identifier (e.g., `"gemini-2.5-flash"`).
    pub model: String,
    /// The instruction sent to the text model.
    pub instruction: String,
}

/// Boxed future returned by [`ServiceGateway::generate_images`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<ImageRef>, ImageError>> + Send + 'a>>;

/// Boxed future returned by [`ServiceGateway::random_prompt`].
pub type PromptFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ImageError>> + Send + 'a>>;

/// Generates images and prompt suggestions via an external API.
///
/// Both calls are all-or-nothing: no retries, no partial results.
pub trait ServiceGateway: Send + Sync {
    /// Generate images for the given request.
    fn generate_images(&self, request: &ImageRequest) -> GenerateFuture<'_>;

    /// Produce a single random text prompt.
    fn random_prompt(&self, request: &PromptRequest) -> PromptFuture<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_request_serialization() {
        let request = ImageRequest {
            model: "imagen-4.0-generate-001".into(),
            prompt: "a cat".into(),
            aspect_ratio: "1:1".into(),
            count: 4,
            mime_type: "image/jpeg".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["aspect_ratio"], "1:1");
        let deserialized: ImageRequest = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, request);
    }
}
