//! Record/replay infrastructure for deterministic testing.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;

/// Port name used for service gateway interactions.
pub const GATEWAY_PORT: &str = "gateway";
