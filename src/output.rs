//! Decoding image references, file naming, and saving with format conversion.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;

use crate::error::ImageError;

/// Split a `data:<mime>;base64,<payload>` reference into MIME type and bytes.
///
/// # Errors
///
/// Returns an error if the reference is not a base64 data URI.
pub fn decode_data_uri(image: &str) -> Result<(String, Vec<u8>), ImageError> {
    let malformed = || ImageError::ImageConversion("Image is not a base64 data URI".to_string());

    let rest = image.strip_prefix("data:").ok_or_else(malformed)?;
    let (meta, payload) = rest.split_once(',').ok_or_else(malformed)?;
    let mime = meta.strip_suffix(";base64").ok_or_else(malformed)?;
    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to decode base64: {e}")))?;
    Ok((mime.to_string(), data))
}

/// Validate the output format parameter.
///
/// # Errors
///
/// Returns an error if the format is not recognized.
pub fn validate_format(format: &str) -> Result<(), ImageError> {
    match format {
        "jpeg" | "png" | "webp" => Ok(()),
        _ => Err(ImageError::InvalidArgument(format!(
            "Unsupported format '{format}'. Valid: jpeg, png, webp"
        ))),
    }
}

/// MIME type to request from the service for an output format.
///
/// The service has no webp output; those images are converted on save.
#[must_use]
pub fn request_mime_type(format: &str) -> &'static str {
    match format {
        "png" => "image/png",
        _ => "image/jpeg",
    }
}

/// Get the file extension for an output format.
#[must_use]
pub fn format_extension(format: &str) -> &'static str {
    match format {
        "png" => "png",
        "webp" => "webp",
        // jpeg and any unknown format default to jpg
        _ => "jpg",
    }
}

/// Generate an output filename from a prompt, format, and grid position.
///
/// Sanitizes the first 50 characters of the prompt to kebab-case and appends
/// a unix timestamp and the 1-based tile number.
#[must_use]
pub fn auto_filename(prompt: &str, format: &str, index: usize) -> String {
    let sanitized = sanitize_for_filename(prompt, 50);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let ext = format_extension(format);
    format!("{sanitized}-{timestamp}-{}.{ext}", index + 1)
}

/// Sanitize a string for use in a filename.
///
/// Converts to lowercase, replaces non-alphanumeric chars with hyphens,
/// collapses consecutive hyphens, and trims to max length.
#[must_use]
pub fn sanitize_for_filename(input: &str, max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut last_was_hyphen = true;

    for ch in input.chars() {
        if result.len() >= max_len {
            break;
        }
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            result.push('-');
            last_was_hyphen = true;
        }
    }

    while result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        "image".to_string()
    } else {
        result
    }
}

/// Save every image of a grid into `dir`, returning the written paths.
///
/// # Errors
///
/// Returns an error if a reference cannot be decoded or a file cannot be written.
pub fn save_grid(
    images: &[String],
    prompt: &str,
    format: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>, ImageError> {
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(images.len());
    for (i, image) in images.iter().enumerate() {
        let (mime, data) = decode_data_uri(image)?;
        let path = dir.join(auto_filename(prompt, format, i));
        save_image(&data, &mime, format, &path)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Save raw image bytes to a file, converting format if necessary.
///
/// # Errors
///
/// Returns an error if the file cannot be written or format conversion fails.
pub fn save_image(
    data: &[u8],
    source_mime: &str,
    target_format: &str,
    output_path: &Path,
) -> Result<(), ImageError> {
    if mime_matches_format(source_mime, target_format) {
        std::fs::write(output_path, data).map_err(ImageError::Io)
    } else {
        convert_and_save(data, target_format, output_path)
    }
}

fn mime_matches_format(mime: &str, format: &str) -> bool {
    matches!((mime, format), ("image/jpeg", "jpeg") | ("image/png", "png") | ("image/webp", "webp"))
}

fn convert_and_save(
    data: &[u8],
    target_format: &str,
    output_path: &Path,
) -> Result<(), ImageError> {
    let img = image::load_from_memory(data)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to decode image: {e}")))?;

    let image_format = match target_format {
        "jpeg" => image::ImageFormat::Jpeg,
        "png" => image::ImageFormat::Png,
        "webp" => image::ImageFormat::WebP,
        other => {
            return Err(ImageError::ImageConversion(format!("Unsupported format: {other}")));
        }
    };

    img.save_with_format(output_path, image_format)
        .map_err(|e| ImageError::ImageConversion(format!("Failed to save as {target_format}: {e}")))
}
