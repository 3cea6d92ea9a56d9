//! On-disk cassette layout.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ImageError;

/// A recorded session: every gateway call in the order it happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Recorded interactions.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Read and parse a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }

    /// Write the cassette as YAML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let yaml = serde_yaml::to_string(self).map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, yaml)
    }
}

/// One recorded call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Global sequence number within the cassette.
    pub seq: u64,
    /// Port name (e.g. `"gateway"`).
    pub port: String,
    /// Method name (e.g. `"generate_images"`).
    pub method: String,
    /// Serialized call input.
    #[serde(default)]
    pub input: serde_json::Value,
    /// What the call returned.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub output: Outcome,
}

/// A recorded call result, stored as `Ok: <value>` or `Err: {status, message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The serialized success value.
    Ok(serde_json::Value),
    /// The failure, with enough detail to rebuild the same user message.
    Err(RecordedError),
}

/// A gateway failure as kept in a cassette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    /// HTTP status, 0 for failures that never got a response.
    #[serde(default)]
    pub status: u16,
    /// Text shown to the user.
    pub message: String,
}

impl From<&ImageError> for RecordedError {
    fn from(error: &ImageError) -> Self {
        match error {
            ImageError::Api { status, message } => {
                Self { status: *status, message: message.clone() }
            }
            other => Self { status: 0, message: other.user_message().unwrap_or_default() },
        }
    }
}

impl From<RecordedError> for ImageError {
    fn from(recorded: RecordedError) -> Self {
        Self::Api { status: recorded.status, message: recorded.message }
    }
}
