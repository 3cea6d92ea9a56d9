//! The fixed set of aspect ratios offered in the selector.

use crate::error::ImageError;

/// A named width:height ratio token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatioOption {
    /// Display label.
    pub label: &'static str,
    /// Ratio token sent to the service (e.g. `"16:9"`).
    pub value: &'static str,
}

/// All selectable aspect ratios, in display order.
pub const ASPECT_RATIOS: [AspectRatioOption; 5] = [
    AspectRatioOption { label: "Kare (1:1)", value: "1:1" },
    AspectRatioOption { label: "Dikey (9:16)", value: "9:16" },
    AspectRatioOption { label: "Dikey (3:4)", value: "3:4" },
    AspectRatioOption { label: "Yatay (16:9)", value: "16:9" },
    AspectRatioOption { label: "Yatay (4:3)", value: "4:3" },
];

/// The ratio selected when a session starts.
#[must_use]
pub fn default_aspect_ratio() -> AspectRatioOption {
    ASPECT_RATIOS[1]
}

impl Default for AspectRatioOption {
    fn default() -> Self {
        default_aspect_ratio()
    }
}

/// Look up an option by its ratio token.
///
/// # Errors
///
/// Returns an error if the token is not one of [`ASPECT_RATIOS`].
pub fn find_aspect_ratio(value: &str) -> Result<AspectRatioOption, ImageError> {
    let value = value.trim();
    ASPECT_RATIOS.iter().copied().find(|option| option.value == value).ok_or_else(|| {
        let valid: Vec<&str> = ASPECT_RATIOS.iter().map(|o| o.value).collect();
        ImageError::InvalidArgument(format!(
            "Unsupported aspect ratio '{value}'. Valid: {}",
            valid.join(", ")
        ))
    })
}
