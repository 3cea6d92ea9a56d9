//! Live adapter for the Gemini / Imagen generation API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::ImageError;
use crate::model::{detect_image_api, ImageApi};
use crate::ports::gateway::{
    GenerateFuture, ImageRef, ImageRequest, PromptFuture, PromptRequest, ServiceGateway,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live gateway that calls the Google AI API.
pub struct GeminiGateway {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiGateway {
    /// Create a new Gemini gateway with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Create a gateway against a different models endpoint.
    #[must_use]
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: Client::new(), api_key, base_url }
    }

    async fn post(
        &self,
        model: &str,
        verb: &str,
        body: &serde_json::Value,
    ) -> Result<String, ImageError> {
        let url = format!("{}/{model}:{verb}", self.base_url);
        debug!(%url, "calling Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = api_error_message(&response_text);
            return Err(ImageError::Api { status: status.as_u16(), message });
        }
        Ok(response_text)
    }

    async fn predict(&self, request: &ImageRequest) -> Result<Vec<ImageRef>, ImageError> {
        let body = serde_json::json!({
            "instances": [{ "prompt": request.prompt }],
            "parameters": {
                "sampleCount": request.count,
                "aspectRatio": request.aspect_ratio,
                "outputMimeType": request.mime_type,
            }
        });

        let response_text = self.post(&request.model, "predict", &body).await?;
        let parsed: PredictResponse = parse(&response_text)?;

        let mut images = Vec::new();
        for prediction in parsed.predictions {
            let Some(data) = prediction.bytes_base64_encoded else { continue };
            let mime_type = prediction.mime_type.unwrap_or_else(|| request.mime_type.clone());
            images.push(to_data_uri(&mime_type, &data)?);
        }

        if images.is_empty() {
            return Err(empty_response("No images in response", &response_text));
        }
        Ok(images)
    }

    async fn generate_content(&self, request: &ImageRequest) -> Result<Vec<ImageRef>, ImageError> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [{"text": request.prompt}]
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "candidateCount": request.count,
                "imageConfig": {
                    "aspectRatio": request.aspect_ratio,
                }
            }
        });

        let response_text = self.post(&request.model, "generateContent", &body).await?;
        let parsed: GeminiResponse = parse(&response_text)?;

        let mut images = Vec::new();
        for candidate in parsed.candidates {
            for part in candidate.content.parts {
                if let Some(inline) = part.inline_data {
                    images.push(to_data_uri(&inline.mime_type, &inline.data)?);
                }
            }
        }

        if images.is_empty() {
            return Err(empty_response("No images in response", &response_text));
        }
        Ok(images)
    }
}

impl ServiceGateway for GeminiGateway {
    fn generate_images(&self, request: &ImageRequest) -> GenerateFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let api = detect_image_api(&request.model).map_err(ImageError::InvalidArgument)?;
            match api {
                ImageApi::Predict => self.predict(&request).await,
                ImageApi::GenerateContent => self.generate_content(&request).await,
            }
        })
    }

    fn random_prompt(&self, request: &PromptRequest) -> PromptFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "contents": [{
                    "parts": [{"text": request.instruction}]
                }]
            });

            let response_text = self.post(&request.model, "generateContent", &body).await?;
            let parsed: GeminiResponse = parse(&response_text)?;

            let text = parsed
                .candidates
                .into_iter()
                .flat_map(|c| c.content.parts)
                .find_map(|p| p.text)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());

            text.ok_or_else(|| empty_response("No text in response", &response_text))
        })
    }
}

fn parse<T: for<'de> Deserialize<'de>>(response_text: &str) -> Result<T, ImageError> {
    serde_json::from_str(response_text)
        .map_err(|e| ImageError::Api { status: 200, message: format!("Failed to parse response: {e}") })
}

/// Pull `error.message` out of a Google error envelope, else the raw body.
fn api_error_message(response_text: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(response_text)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| response_text.to_string())
}

fn to_data_uri(mime_type: &str, data: &str) -> Result<ImageRef, ImageError> {
    // Corrupt payloads must not reach the grid.
    base64::engine::general_purpose::STANDARD.decode(data).map_err(|e| ImageError::Api {
        status: 200,
        message: format!("Failed to decode base64: {e}"),
    })?;
    Ok(format!("data:{mime_type};base64,{data}"))
}

fn empty_response(what: &str, response_text: &str) -> ImageError {
    let truncated = if response_text.len() > 500 {
        let mut end = 500;
        while !response_text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &response_text[..end])
    } else {
        response_text.to_string()
    };
    ImageError::Api { status: 200, message: format!("{what}. Body: {truncated}") }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}
