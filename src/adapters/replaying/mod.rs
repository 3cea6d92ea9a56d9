//! Replaying adapters that serve recorded interactions from cassettes.

pub mod gateway;

use std::sync::{Arc, Mutex};

use crate::cassette::format::Outcome;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::ImageError;

/// Retrieve the next recorded outcome for a given port and method.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<Outcome, ImageError> {
    let mut guard =
        replayer.lock().map_err(|e| ImageError::Config(format!("replayer lock poisoned: {e}")))?;
    guard.next_interaction(port, method).map(|i| i.output).map_err(ImageError::Config)
}

/// Turn a replayed outcome back into the gateway's `Result`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: Outcome,
) -> Result<T, ImageError> {
    match output {
        Outcome::Ok(value) => serde_json::from_value(value)
            .map_err(|e| ImageError::Config(format!("Malformed cassette output: {e}"))),
        Outcome::Err(recorded) => Err(recorded.into()),
    }
}
