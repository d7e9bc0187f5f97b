//! playbill-cli: command-line surface for the transcript generator.

use std::sync::{Arc, OnceLock};

use playbill_source::{OllamaSource, TranscriptSource};

/// Stable crate label used by bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "playbill-cli"
}

/// Environment variable naming the generative source endpoint.
pub const ENV_BASE_URL: &str = "OLLAMA_BASE_URL";

static VERSION: OnceLock<String> = OnceLock::new();

/// Set the version string for `--version` output.
pub fn set_version(version: &str) {
    let _ = VERSION.set(version.to_string());
}

fn get_version() -> &'static str {
    VERSION.get().map(|s| s.as_str()).unwrap_or("dev")
}

pub(crate) fn help_text() -> String {
    "\
playbill generates grammar-checked conversation transcript fixtures.

Each transcript is drafted by a generative source, validated against the
line grammar (`name: message`, lowercase names, 2-4 distinct speakers), and
retried or skipped when the draft does not conform.

Usage:
  playbill [flags]

Flags:
  -c, --characters string        Comma-separated character pool (lowercase a-z names)
      --characters-file string   JSON file containing an array of character names
  -n, --count int                Number of transcript files to generate (required)
  -m, --messages int             Approximate messages per transcript (default 100)
  -o, --output-dir string        Output directory (default \"inputs\")
      --model string             Model name for the generative source (default \"gpt-oss:20b\")
      --retries int              Additional attempts per file after the first (default 3)
      --select string            Cast selection policy: random or rotation (default \"random\")
      --seed int                 Seed for deterministic cast selection
      --no-perturb               Replay the identical prompt on retries
      --json                     Print the job report as JSON
      --verbose                  Print per-attempt diagnostics to stderr
  -h, --help                     Help for playbill
  -v, --version                  Version for playbill

Exactly one of --characters / --characters-file must be supplied.
The OLLAMA_BASE_URL environment variable selects the generative source.\n"
        .to_string()
}

/// Buffered command output: what to print and how to exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Environment boundary for the CLI: file reads and source construction.
///
/// The real backend reads the filesystem and opens an Ollama-served source;
/// tests swap in a scripted source.
pub trait GeneratorBackend {
    /// Read a characters file from disk.
    fn read_file(&self, path: &str) -> Result<String, String>;
    /// Resolve the generative source base URL.
    fn base_url(&self) -> Result<String, String>;
    /// Open the generative source for this job.
    fn open_source(&self, base_url: &str) -> Result<Arc<dyn TranscriptSource>, String>;
}

/// Backend talking to a real Ollama server.
pub struct OllamaBackend;

impl GeneratorBackend for OllamaBackend {
    fn read_file(&self, path: &str) -> Result<String, String> {
        std::fs::read_to_string(path).map_err(|e| format!("read file: {e}"))
    }

    fn base_url(&self) -> Result<String, String> {
        std::env::var(ENV_BASE_URL).map_err(|_| format!("{ENV_BASE_URL} not set"))
    }

    fn open_source(&self, base_url: &str) -> Result<Arc<dyn TranscriptSource>, String> {
        OllamaSource::new(base_url)
            .map(|source| Arc::new(source) as Arc<dyn TranscriptSource>)
            .map_err(|e| e.to_string())
    }
}

pub mod generate;
pub mod job;
pub mod retry;

#[cfg(test)]
pub(crate) mod tests_common;

pub fn run_cli_for_test(args: &[&str], backend: &dyn GeneratorBackend) -> CommandOutput {
    let mut out = CommandOutput {
        stdout: String::new(),
        stderr: String::new(),
        exit_code: 0,
    };

    let Some((first, _)) = args.split_first() else {
        // No args: show help (exit 0).
        out.stdout = help_text();
        return out;
    };

    match *first {
        "--help" | "-h" | "help" => {
            out.stdout = help_text();
            out
        }
        "--version" | "-v" => {
            out.stdout = format!("playbill version {}\n", get_version());
            out
        }
        _ => generate::run_generate_for_test(args, backend),
    }
}

pub fn run_cli(args: &[String], backend: &dyn GeneratorBackend) -> CommandOutput {
    let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    run_cli_for_test(&refs, backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_common::MockGeneratorBackend;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "playbill-cli");
    }

    #[test]
    fn no_args_shows_help_exit_0() {
        let backend = MockGeneratorBackend::new();
        let out = run_cli_for_test(&[], &backend);
        assert_eq!(out.exit_code, 0);
        assert!(out.stdout.contains("playbill generates"));
        assert!(out.stdout.contains("Usage:"));
        assert!(out.stderr.is_empty());
    }

    #[test]
    fn help_flag_shows_help_exit_0() {
        let backend = MockGeneratorBackend::new();
        for flag in &["--help", "-h", "help"] {
            let out = run_cli_for_test(&[flag], &backend);
            assert_eq!(out.exit_code, 0, "flag={flag}");
            assert!(out.stdout.contains("Usage:"), "flag={flag}");
        }
    }

    #[test]
    fn version_flag_shows_version_exit_0() {
        let backend = MockGeneratorBackend::new();
        for flag in &["--version", "-v"] {
            let out = run_cli_for_test(&[flag], &backend);
            assert_eq!(out.exit_code, 0, "flag={flag}");
            assert!(
                out.stdout.starts_with("playbill version "),
                "flag={flag}: got {:?}",
                out.stdout
            );
        }
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        let backend = MockGeneratorBackend::new();
        let out = run_cli_for_test(&["--bogus"], &backend);
        assert_eq!(out.exit_code, 2);
        assert!(out.stderr.contains("unknown flag"));
        assert!(out.stdout.is_empty());
    }

    #[test]
    fn missing_base_url_is_reported_before_generation() {
        let backend = MockGeneratorBackend::new().without_base_url();
        let out = run_cli_for_test(
            &["--characters", "matt,rob", "--count", "1"],
            &backend,
        );
        assert_eq!(out.exit_code, 1);
        assert!(out.stderr.contains("OLLAMA_BASE_URL"));
        assert_eq!(backend.source.call_count(), 0);
    }
}
