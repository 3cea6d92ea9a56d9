//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod dictation;
pub mod gateway;

pub use dictation::Dictation;
pub use gateway::{ImageRef, ImageRequest, PromptRequest, ServiceGateway};
