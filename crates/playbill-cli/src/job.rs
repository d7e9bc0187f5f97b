//! Generation job orchestration and reporting.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use playbill_core::cast::{CastSelector, CharacterPool, SelectionPolicy};
use playbill_core::grammar;
use playbill_core::store::TranscriptStore;
use playbill_source::{GenerateParams, TranscriptSource};

use crate::retry::{FileOutcome, RetryController};

/// Immutable configuration for one generation job.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub pool: CharacterPool,
    pub count: usize,
    pub messages: usize,
    pub output_dir: PathBuf,
    pub model: String,
    pub retries: u32,
    pub selection: SelectionPolicy,
    pub perturb: bool,
    pub seed: Option<u64>,
    pub verbose: bool,
}

/// One skipped file index with its recorded reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub index: usize,
    pub reason: String,
}

/// Job-level summary: one outcome per requested file index.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub accepted: Vec<usize>,
    pub skipped: Vec<SkippedFile>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.skipped.len()
    }
}

/// A finished run: the report plus buffered progress and warning lines.
#[derive(Debug, Clone)]
pub struct JobRunOutput {
    pub report: JobReport,
    pub progress: Vec<String>,
    pub warnings: Vec<String>,
}

/// Run the whole job: one fresh retry controller per file index, sequential
/// indices, a skip never blocks later files.
pub async fn run_job(
    job: &GenerationJob,
    source: &dyn TranscriptSource,
    cancel: &CancellationToken,
) -> Result<JobRunOutput, String> {
    let store = TranscriptStore::new(&job.output_dir)?;
    store.ensure_dir()?;

    let params = GenerateParams::for_model(&job.model);
    let controller = RetryController {
        ceiling: job.retries,
        perturb: job.perturb,
    };
    let mut selector = CastSelector::new(job.selection);
    let mut rng: StdRng = match job.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let started_at = Utc::now();
    let mut accepted: Vec<usize> = Vec::new();
    let mut skipped: Vec<SkippedFile> = Vec::new();
    let mut progress: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for index in 1..=job.count {
        let file_name = TranscriptStore::file_name(index);

        if cancel.is_cancelled() {
            skipped.push(SkippedFile {
                index,
                reason: "cancelled".to_string(),
            });
            warnings.push(format!("skipping {file_name}: cancelled"));
            continue;
        }

        let cast = selector.draw(&job.pool, &mut rng);
        progress.push(format!(
            "[{index}/{total}] generating {file_name} with cast [{list}]",
            total = job.count,
            list = cast.join(", ")
        ));

        let base_variation: u64 = rng.gen();
        let run = controller
            .run(source, &params, &cast, job.messages, base_variation, cancel)
            .await;

        if job.verbose {
            for failure in &run.failures {
                warnings.push(format!(
                    "{file_name} attempt rejected: {}",
                    failure.describe()
                ));
            }
        }

        match run.outcome {
            FileOutcome::Accepted { raw_text } => match store.write_transcript(index, &raw_text) {
                Ok(_) => {
                    if job.verbose {
                        describe_accepted(&mut warnings, &file_name, &raw_text, &cast, job.messages);
                    }
                    accepted.push(index);
                }
                Err(err) => {
                    warnings.push(format!("skipping {file_name}: {err}"));
                    skipped.push(SkippedFile {
                        index,
                        reason: format!("write-error: {err}"),
                    });
                }
            },
            FileOutcome::Skipped { last_failure } => {
                warnings.push(format!(
                    "skipping {file_name}: all {attempts} attempts failed ({detail})",
                    attempts = run.attempts,
                    detail = last_failure.describe()
                ));
                skipped.push(SkippedFile {
                    index,
                    reason: last_failure.label(),
                });
            }
            FileOutcome::Cancelled => {
                warnings.push(format!("skipping {file_name}: cancelled"));
                skipped.push(SkippedFile {
                    index,
                    reason: "cancelled".to_string(),
                });
            }
        }
    }

    let report = JobReport {
        accepted,
        skipped,
        started_at,
        finished_at: Utc::now(),
    };
    Ok(JobRunOutput {
        report,
        progress,
        warnings,
    })
}

/// Diagnostics for an accepted transcript: speaker set, count drift beyond
/// half the target, and grammar-legal speakers outside the drawn cast.
fn describe_accepted(
    warnings: &mut Vec<String>,
    file_name: &str,
    raw_text: &str,
    cast: &[String],
    target_messages: usize,
) {
    let Ok(transcript) = grammar::parse(raw_text) else {
        return;
    };
    warnings.push(format!(
        "{file_name}: {count} messages from [{speakers}]",
        count = transcript.len(),
        speakers = transcript.speakers().join(", ")
    ));
    let len = transcript.len();
    if len * 2 < target_messages || len > target_messages * 2 {
        warnings.push(format!(
            "{file_name}: message count {len} is far from target {target_messages}"
        ));
    }
    let stray: Vec<&str> = transcript
        .speakers()
        .into_iter()
        .filter(|speaker| !cast.iter().any(|name| name == speaker))
        .collect();
    if !stray.is_empty() {
        warnings.push(format!(
            "{file_name}: speakers outside the drawn cast: [{}]",
            stray.join(", ")
        ));
    }
}
