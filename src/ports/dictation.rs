//! Dictation port for an optional speech-to-text capability.

use crate::error::ImageError;

/// Receives each transcript produced while dictation is active.
pub type TranscriptSink = Box<dyn Fn(String) + Send + Sync>;

/// An optional voice-to-text source.
///
/// A host without speech support reports `available() == false`; that is a
/// normal state, not an error.
pub trait Dictation: Send + Sync {
    /// Whether the capability exists on this host.
    fn available(&self) -> bool;

    /// Start listening, delivering transcripts to `on_result`.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability exists but cannot be started.
    fn start(&self, on_result: TranscriptSink) -> Result<(), ImageError>;

    /// Stop listening. Does nothing if not started.
    fn stop(&self);
}
