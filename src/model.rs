//! Model name resolution and endpoint detection.

/// How an image model is invoked on the Gemini API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageApi {
    /// Imagen models: `:predict` with `instances`/`parameters`.
    Predict,
    /// Gemini native image models: `:generateContent` with image modality.
    GenerateContent,
}

/// Default image model alias.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4";

/// Default text model alias used for random prompts.
pub const DEFAULT_TEXT_MODEL: &str = "flash";

/// Short name aliases for popular models.
const ALIASES: &[(&str, &str)] = &[
    ("imagen-4", "imagen-4.0-generate-001"),
    ("imagen-4-fast", "imagen-4.0-fast-generate-001"),
    ("imagen-4-ultra", "imagen-4.0-ultra-generate-001"),
    ("nano-banana", "gemini-2.5-flash-image"),
    ("flash", "gemini-2.5-flash"),
    ("flash-lite", "gemini-2.5-flash-lite"),
];

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    for &(alias, full) in ALIASES {
        if name == alias {
            return full.to_string();
        }
    }
    name.to_string()
}

/// Detect how to call a resolved image model.
///
/// # Errors
///
/// Returns an error if the model name doesn't match a known image model prefix.
pub fn detect_image_api(model: &str) -> Result<ImageApi, String> {
    if model.starts_with("imagen") {
        Ok(ImageApi::Predict)
    } else if model.starts_with("gemini") && model.contains("image") {
        Ok(ImageApi::GenerateContent)
    } else {
        Err(format!(
            "Unknown image model '{model}'. Expected 'imagen-*' or 'gemini-*-image*'."
        ))
    }
}

/// Check that a resolved model can produce text.
///
/// # Errors
///
/// Returns an error if the model is not a Gemini text model.
pub fn validate_text_model(model: &str) -> Result<(), String> {
    if model.starts_with("gemini") && !model.contains("image") {
        Ok(())
    } else {
        Err(format!("Unknown text model '{model}'. Expected 'gemini-*'."))
    }
}
