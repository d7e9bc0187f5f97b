//! Generative source trait: the capability boundary of the pipeline.
//!
//! Implementations can call a real model server or be mocked for testing.

use std::time::Duration;

use async_trait::async_trait;

use playbill_core::prompt::Prompt;

use crate::error::SourceError;

/// Default model name for an Ollama-served source.
pub const DEFAULT_MODEL: &str = "gpt-oss:20b";

/// Default sampling temperature for transcript generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-request generation knobs.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GenerateParams {
    pub fn for_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }
}

/// The generative source interface.
///
/// One call produces one raw transcript candidate. The source is treated as
/// unreliable: any failure is reported through the normalized `SourceError`
/// taxonomy and the caller decides whether to retry.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn generate(&self, prompt: &Prompt, params: &GenerateParams)
        -> Result<String, SourceError>;
}
