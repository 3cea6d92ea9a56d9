//! Dictation adapters for the host's speech-to-text capability.

use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::ImageError;
use crate::ports::dictation::{Dictation, TranscriptSink};

/// Dictation on a host without any speech capability.
#[derive(Debug, Default)]
pub struct UnsupportedDictation;

impl Dictation for UnsupportedDictation {
    fn available(&self) -> bool {
        false
    }

    fn start(&self, _on_result: TranscriptSink) -> Result<(), ImageError> {
        Err(ImageError::Dictation("speech recognition is not supported on this host".into()))
    }

    fn stop(&self) {}
}

/// Dictation backed by an external speech-to-text command.
///
/// The command is run through `sh -c`; every non-empty line it prints on
/// stdout is one transcript. Nothing is delivered once [`Dictation::stop`]
/// has returned.
pub struct CommandDictation {
    command: String,
    listener: Mutex<Option<Listener>>,
}

/// Handle to a running speech command.
struct Listener {
    stop: oneshot::Sender<()>,
    /// Cleared on stop; held while a transcript is delivered.
    active: Arc<Mutex<bool>>,
}

impl CommandDictation {
    /// Create a dictation source that runs `command` while listening.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into(), listener: Mutex::new(None) }
    }
}

impl Dictation for CommandDictation {
    fn available(&self) -> bool {
        !self.command.trim().is_empty()
    }

    fn start(&self, on_result: TranscriptSink) -> Result<(), ImageError> {
        let mut slot =
            self.listener.lock().map_err(|e| ImageError::Dictation(format!("lock poisoned: {e}")))?;
        // A listener whose command already exited can be replaced.
        if slot.as_ref().is_some_and(|listener| !listener.stop.is_closed()) {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ImageError::Dictation(format!("no async runtime: {e}")))?;
        let mut child = Command::new("sh")
            .args(["-c", &self.command])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ImageError::Dictation(format!("failed to run '{}': {e}", self.command)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ImageError::Dictation("speech command has no stdout".into()))?;

        let (stop, stopped) = oneshot::channel();
        let active = Arc::new(Mutex::new(true));
        runtime.spawn(read_transcripts(child, stdout, stopped, Arc::clone(&active), on_result));
        *slot = Some(Listener { stop, active });
        debug!(command = %self.command, "dictation started");
        Ok(())
    }

    fn stop(&self) {
        let Ok(mut slot) = self.listener.lock() else { return };
        let Some(listener) = slot.take() else { return };
        if let Ok(mut active) = listener.active.lock() {
            *active = false;
        }
        let _ = listener.stop.send(());
        debug!("dictation stopped");
    }
}

impl Drop for CommandDictation {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn read_transcripts(
    mut child: Child,
    stdout: ChildStdout,
    mut stopped: oneshot::Receiver<()>,
    active: Arc<Mutex<bool>>,
    on_result: TranscriptSink,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        let line = tokio::select! {
            biased;
            _ = &mut stopped => break,
            line = lines.next_line() => line,
        };
        match line {
            Ok(Some(text)) => {
                let text = text.trim();
                if !text.is_empty() && !deliver(&active, &on_result, text) {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("dictation output unreadable: {e}");
                break;
            }
        }
    }

    drop(lines);
    let _ = child.start_kill();
    let _ = child.wait().await;
    debug!("dictation reader finished");
}

/// Hand one transcript to the sink; false once listening was stopped.
fn deliver(active: &Mutex<bool>, on_result: &TranscriptSink, text: &str) -> bool {
    let Ok(active) = active.lock() else { return false };
    if *active {
        on_result(text.to_string());
    }
    *active
}
