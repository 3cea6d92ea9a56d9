//! Recording adapters that capture interactions to cassettes.

pub mod gateway;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;
use crate::error::ImageError;

/// Append one gateway result to the shared recorder.
///
/// A value that cannot be serialized is logged and skipped; recording never
/// changes the result seen by the caller.
pub(crate) fn record_result<I, T>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, ImageError>,
) where
    I: Serialize,
    T: Serialize,
{
    let mut guard = match recorder.lock() {
        Ok(guard) => guard,
        Err(e) => {
            warn!("recorder lock poisoned: {e}");
            return;
        }
    };
    if let Err(e) = guard.record(port, method, input, result) {
        warn!("skipping {port}::{method} recording: {e}");
    }
}
