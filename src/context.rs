//! Service context that bundles all port trait objects.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::adapters::live::dictation::{CommandDictation, UnsupportedDictation};
use crate::adapters::live::gemini::GeminiGateway;
use crate::adapters::recording::gateway::RecordingGateway;
use crate::adapters::replaying::gateway::ReplayingGateway;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::ImageError;
use crate::ports::{Dictation, ServiceGateway};

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Image and prompt generation port.
    pub gateway: Box<dyn ServiceGateway>,
    /// Speech-to-text port.
    pub dictation: Box<dyn Dictation>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// The gateway holding the other recorder handle must be dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<std::path::PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context against the Gemini API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn live(config: &Config) -> Result<Self, ImageError> {
        let key = config.gemini_key().ok_or(ImageError::MissingApiKey {
            provider: "Gemini".into(),
            env_var: "GEMINI_API_KEY".into(),
        })?;
        Ok(Self { gateway: Box::new(GeminiGateway::new(key)), dictation: dictation(config) })
    }

    /// Create a recording context that wraps the live gateway with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), ImageError> {
        let live_ctx = Self::live(config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = std::path::PathBuf::from(".imagegrid/cassettes")
            .join(&timestamp)
            .join("gateway.cassette.yaml");
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-gateway"),
            get_commit_hash(),
        )));

        let gateway = RecordingGateway::new(live_ctx.gateway, Arc::clone(&recorder));
        let ctx = Self { gateway: Box::new(gateway), dictation: live_ctx.dictation };
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file. No API key is needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path, config: &Config) -> Result<Self, ImageError> {
        let replayer = load_cassette(path)
            .map_err(|e| ImageError::Config(format!("Failed to load cassette: {e}")))?;
        let gateway = ReplayingGateway::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { gateway: Box::new(gateway), dictation: dictation(config) })
    }
}

fn dictation(config: &Config) -> Box<dyn Dictation> {
    match config.dictation.command.as_deref().map(str::trim) {
        Some(command) if !command.is_empty() => Box::new(CommandDictation::new(command)),
        _ => Box::new(UnsupportedDictation),
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
