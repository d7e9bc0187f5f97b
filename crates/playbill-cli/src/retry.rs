//! Per-file retry control: a small state machine plus the async driver that
//! walks one file index from drafting to acceptance or skip.

use playbill_core::grammar::{self, InvalidReason, ValidationResult};
use playbill_core::prompt::build_prompt;
use playbill_source::{GenerateParams, SourceError, TranscriptSource};
use tokio_util::sync::CancellationToken;

/// Default number of additional attempts beyond the first.
pub const DEFAULT_RETRY_CEILING: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Drafting,
    Validating,
    Accepted,
    Retrying,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptEvent {
    DraftProduced,
    DraftFailed,
    ValidationPassed,
    ValidationFailed,
    RedraftStarted,
    RetryBudgetExhausted,
    CancelObserved,
}

pub fn next_state(_current: AttemptState, event: AttemptEvent) -> AttemptState {
    match event {
        AttemptEvent::DraftProduced => AttemptState::Validating,
        AttemptEvent::DraftFailed | AttemptEvent::ValidationFailed => AttemptState::Retrying,
        AttemptEvent::ValidationPassed => AttemptState::Accepted,
        AttemptEvent::RedraftStarted => AttemptState::Drafting,
        AttemptEvent::RetryBudgetExhausted | AttemptEvent::CancelObserved => AttemptState::Skipped,
    }
}

/// Classification of one failed attempt. Source failures consume retry
/// budget exactly like grammar violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Grammar { reason: InvalidReason, line: usize },
    Source { error: SourceError },
}

impl AttemptFailure {
    /// Stable label used as a skip reason in job reports.
    pub fn label(&self) -> String {
        match self {
            Self::Grammar { reason, .. } => reason.as_str().to_string(),
            Self::Source { error } => error.kind().to_string(),
        }
    }

    /// Human-readable diagnostic line.
    pub fn describe(&self) -> String {
        match self {
            Self::Grammar { reason, line } => format!("{reason} at line {line}"),
            Self::Source { error } => error.to_string(),
        }
    }
}

/// Terminal outcome for one file index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Accepted { raw_text: String },
    Skipped { last_failure: AttemptFailure },
    Cancelled,
}

/// Full record of one file's drafting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRun {
    pub outcome: FileOutcome,
    pub attempts: u32,
    pub failures: Vec<AttemptFailure>,
    pub final_state: AttemptState,
}

/// Drives the draft/validate/retry loop for a single file index.
///
/// `ceiling` is the number of additional attempts after the first, so a
/// ceiling of 3 permits 4 source calls in total. `perturb` rephrases the
/// prompt on each retry instead of replaying a draft request that already
/// failed against a stateless source.
#[derive(Debug, Clone, Copy)]
pub struct RetryController {
    pub ceiling: u32,
    pub perturb: bool,
}

impl Default for RetryController {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_RETRY_CEILING,
            perturb: true,
        }
    }
}

impl RetryController {
    pub async fn run(
        &self,
        source: &dyn TranscriptSource,
        params: &GenerateParams,
        cast: &[String],
        target_messages: usize,
        base_variation: u64,
        cancel: &CancellationToken,
    ) -> FileRun {
        let mut state = AttemptState::Drafting;
        let mut attempts: u32 = 0;
        let mut failures: Vec<AttemptFailure> = Vec::new();

        loop {
            if cancel.is_cancelled() {
                state = next_state(state, AttemptEvent::CancelObserved);
                break FileRun {
                    outcome: FileOutcome::Cancelled,
                    attempts,
                    failures,
                    final_state: state,
                };
            }

            let variation = if self.perturb {
                base_variation + u64::from(attempts)
            } else {
                base_variation
            };
            let prompt = build_prompt(cast, target_messages, variation);

            let draft = tokio::select! {
                _ = cancel.cancelled() => {
                    state = next_state(state, AttemptEvent::CancelObserved);
                    break FileRun {
                        outcome: FileOutcome::Cancelled,
                        attempts,
                        failures,
                        final_state: state,
                    };
                }
                result = source.generate(&prompt, params) => result,
            };
            attempts += 1;

            match draft {
                Ok(raw_text) => {
                    state = next_state(state, AttemptEvent::DraftProduced);
                    match grammar::validate(&raw_text) {
                        ValidationResult::Valid => {
                            state = next_state(state, AttemptEvent::ValidationPassed);
                            break FileRun {
                                outcome: FileOutcome::Accepted { raw_text },
                                attempts,
                                failures,
                                final_state: state,
                            };
                        }
                        ValidationResult::Invalid { reason, line } => {
                            state = next_state(state, AttemptEvent::ValidationFailed);
                            failures.push(AttemptFailure::Grammar { reason, line });
                        }
                    }
                }
                Err(error) => {
                    state = next_state(state, AttemptEvent::DraftFailed);
                    failures.push(AttemptFailure::Source { error });
                }
            }

            if attempts > self.ceiling {
                state = next_state(state, AttemptEvent::RetryBudgetExhausted);
                let last_failure = failures.last().cloned().unwrap_or(AttemptFailure::Source {
                    error: SourceError::EmptyResponse,
                });
                break FileRun {
                    outcome: FileOutcome::Skipped { last_failure },
                    attempts,
                    failures,
                    final_state: state,
                };
            }
            state = next_state(state, AttemptEvent::RedraftStarted);
        }
    }
}
