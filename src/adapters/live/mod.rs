//! Live adapters that talk to real services and host capabilities.

pub mod dictation;
pub mod gemini;
