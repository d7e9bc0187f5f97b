//! playbill-source: generative text source abstraction.
//!
//! Provides a transport-agnostic `TranscriptSource` trait with
//! implementations for:
//! - `OllamaSource`: OpenAI-compatible chat endpoint (an Ollama server)
//! - `MockSource`: scripted mock for unit testing
//!
//! All failures are normalized into `SourceError` so retry logic never
//! depends on transport-specific error shapes.

pub mod error;
pub mod mock;
pub mod ollama;
pub mod service;

pub use error::SourceError;
pub use mock::MockSource;
pub use ollama::OllamaSource;
pub use service::{GenerateParams, TranscriptSource, DEFAULT_MODEL};

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "playbill-source"
}
