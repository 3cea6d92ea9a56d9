//! Builds a cassette from live gateway results.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use super::format::{Cassette, Interaction, Outcome, RecordedError};
use crate::error::ImageError;

/// Accumulates gateway interactions for one run.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    commit: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Start a recording that [`finish`](Self::finish) writes to `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self { path: path.into(), name: name.into(), commit: commit.into(), interactions: Vec::new() }
    }

    /// Append one call and its result.
    ///
    /// Errors are stored as [`RecordedError`] so a replay shows the same
    /// user message as the live run.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` or the success value cannot be serialized;
    /// nothing is appended in that case.
    pub fn record<I, T>(
        &mut self,
        port: &str,
        method: &str,
        input: &I,
        result: &Result<T, ImageError>,
    ) -> Result<(), serde_json::Error>
    where
        I: Serialize,
        T: Serialize,
    {
        let output = match result {
            Ok(value) => Outcome::Ok(serde_json::to_value(value)?),
            Err(e) => Outcome::Err(RecordedError::from(e)),
        };
        self.interactions.push(Interaction {
            seq: self.interactions.len() as u64,
            port: port.to_string(),
            method: method.to_string(),
            input: serde_json::to_value(input)?,
            output,
        });
        Ok(())
    }

    /// Stamp the cassette and write it to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            commit: self.commit,
            interactions: self.interactions,
        };
        cassette.save(&self.path)?;
        Ok(self.path)
    }
}
