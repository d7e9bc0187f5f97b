//! Scripted mock source for unit testing.
//!
//! Plays back a queue of pre-configured results and records every call.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use playbill_core::prompt::Prompt;

use crate::error::SourceError;
use crate::service::{GenerateParams, TranscriptSource};

/// A recorded call to the mock source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub model: String,
}

/// Mock implementation of `TranscriptSource` for testing.
///
/// Scripted results are consumed in order; once the script is exhausted the
/// configured fallback (if any) repeats forever.
pub struct MockSource {
    script: Mutex<VecDeque<Result<String, SourceError>>>,
    fallback: Option<Result<String, SourceError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response.
    pub fn with_response(self, text: &str) -> Self {
        self.push(Ok(text.to_string()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, err: SourceError) -> Self {
        self.push(Err(err));
        self
    }

    /// Repeat the given response once the script is exhausted.
    pub fn with_repeating_response(mut self, text: &str) -> Self {
        self.fallback = Some(Ok(text.to_string()));
        self
    }

    /// Repeat the given failure once the script is exhausted.
    pub fn with_repeating_error(mut self, err: SourceError) -> Self {
        self.fallback = Some(Err(err));
        self
    }

    /// Return all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Return the number of recorded calls.
    pub fn call_count(&self) -> usize {
        match self.calls.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn push(&self, entry: Result<String, SourceError>) {
        match self.script.lock() {
            Ok(mut guard) => guard.push_back(entry),
            Err(poisoned) => poisoned.into_inner().push_back(entry),
        }
    }

    fn next_result(&self) -> Result<String, SourceError> {
        let scripted = match self.script.lock() {
            Ok(mut guard) => guard.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        if let Some(result) = scripted {
            return result;
        }
        match &self.fallback {
            Some(result) => result.clone(),
            None => Err(SourceError::Transport {
                message: "mock script exhausted".to_string(),
            }),
        }
    }

    fn record(&self, call: RecordedCall) {
        match self.calls.lock() {
            Ok(mut guard) => guard.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }
}

#[async_trait]
impl TranscriptSource for MockSource {
    async fn generate(
        &self,
        prompt: &Prompt,
        params: &GenerateParams,
    ) -> Result<String, SourceError> {
        self.record(RecordedCall {
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            model: params.model.clone(),
        });
        self.next_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(user: &str) -> Prompt {
        Prompt {
            system: "sys".to_string(),
            user: user.to_string(),
        }
    }

    #[tokio::test]
    async fn scripted_results_play_back_in_order() {
        let source = MockSource::new()
            .with_response("matt: hi\nrob: hey")
            .with_error(SourceError::EmptyResponse);
        let params = GenerateParams::default();

        let first = source.generate(&prompt("a"), &params).await;
        assert_eq!(first.as_deref(), Ok("matt: hi\nrob: hey"));

        let second = source.generate(&prompt("b"), &params).await;
        assert_eq!(second, Err(SourceError::EmptyResponse));
    }

    #[tokio::test]
    async fn exhausted_script_without_fallback_reports_transport_error() {
        let source = MockSource::new();
        let result = source.generate(&prompt("a"), &GenerateParams::default()).await;
        match result {
            Err(SourceError::Transport { message }) => {
                assert!(message.contains("exhausted"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fallback_repeats_forever() {
        let source = MockSource::new().with_repeating_response("Matt: hi");
        let params = GenerateParams::default();
        for _ in 0..5 {
            let result = source.generate(&prompt("a"), &params).await;
            assert_eq!(result.as_deref(), Ok("Matt: hi"));
        }
        assert_eq!(source.call_count(), 5);
    }

    #[tokio::test]
    async fn calls_are_recorded_with_prompt_and_model() {
        let source = MockSource::new().with_repeating_response("x: y");
        let params = GenerateParams::for_model("llama3:8b");
        let _ = source.generate(&prompt("first"), &params).await;
        let _ = source.generate(&prompt("second"), &params).await;

        let calls = source.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].user, "first");
        assert_eq!(calls[1].user, "second");
        assert_eq!(calls[0].model, "llama3:8b");
    }
}
