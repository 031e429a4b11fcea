//! CaptionFlow Core Engine
//!
//! Caption timing and layout for a video renderer.
//! Handles subtitle ingestion, timing lookups, text measurement and line breaking.

pub mod captions;
pub mod engine;
pub mod settings;
pub mod text;
pub mod timing;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_destructive;
