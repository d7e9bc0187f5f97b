//! Flag parsing and execution for the playbill generation command.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use playbill_core::cast::{CharacterPool, SelectionPolicy};
use playbill_source::DEFAULT_MODEL;

use crate::job::{run_job, GenerationJob};
use crate::retry::DEFAULT_RETRY_CEILING;
use crate::{CommandOutput, GeneratorBackend};

pub const DEFAULT_MESSAGES: usize = 100;
pub const DEFAULT_OUTPUT_DIR: &str = "inputs";

/// Run the generation command from test arguments.
pub fn run_generate_for_test(args: &[&str], backend: &dyn GeneratorBackend) -> CommandOutput {
    let owned: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
    run_generate(&owned, backend)
}

pub fn run_generate(args: &[String], backend: &dyn GeneratorBackend) -> CommandOutput {
    match execute_generate(args, backend) {
        Ok(output) => output,
        Err((exit_code, message)) => CommandOutput {
            stdout: String::new(),
            stderr: format!("{message}\n"),
            exit_code,
        },
    }
}

fn execute_generate(
    args: &[String],
    backend: &dyn GeneratorBackend,
) -> Result<CommandOutput, (i32, String)> {
    let parsed = parse_generate_args(args)?;
    let job = build_job(&parsed, backend)?;

    let base_url = backend.base_url().map_err(|e| (1, e))?;
    let source = backend.open_source(&base_url).map_err(|e| (1, e))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| (1, format!("start runtime: {e}")))?;

    let cancel = CancellationToken::new();
    let output = runtime.block_on(async {
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_cancel.cancel();
            }
        });
        run_job(&job, source.as_ref(), &cancel).await
    });
    let output = output.map_err(|e| (1, e))?;

    let report = &output.report;
    let mut stdout = String::new();
    if parsed.json {
        let encoded = serde_json::to_string_pretty(report)
            .map_err(|e| (1, format!("encode report: {e}")))?;
        stdout.push_str(&encoded);
        stdout.push('\n');
    } else {
        for line in &output.progress {
            stdout.push_str(line);
            stdout.push('\n');
        }
        stdout.push_str(&format!(
            "\ndone: {accepted} accepted, {skipped} skipped out of {total} total\n",
            accepted = report.accepted.len(),
            skipped = report.skipped.len(),
            total = job.count
        ));
    }

    let mut stderr = String::new();
    for line in &output.warnings {
        stderr.push_str(line);
        stderr.push('\n');
    }

    let exit_code = if report.skipped.is_empty() { 0 } else { 1 };
    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code,
    })
}

#[derive(Debug, Default)]
struct ParsedGenerateArgs {
    characters: String,
    characters_file: String,
    count: Option<i64>,
    messages: Option<i64>,
    output_dir: String,
    model: String,
    retries: Option<i64>,
    select: String,
    seed: Option<u64>,
    perturb_off: bool,
    json: bool,
    verbose: bool,
}

fn parse_generate_args(args: &[String]) -> Result<ParsedGenerateArgs, (i32, String)> {
    let mut parsed = ParsedGenerateArgs::default();
    let mut idx = 0usize;

    while idx < args.len() {
        let token = &args[idx];
        match token.as_str() {
            "-h" | "--help" | "help" => {
                return Err((0, crate::help_text()));
            }
            "--json" => {
                parsed.json = true;
            }
            "--verbose" => {
                parsed.verbose = true;
            }
            "--no-perturb" => {
                parsed.perturb_off = true;
            }
            flag if flag.starts_with("--characters=") || flag.starts_with("-c=") => {
                parsed.characters = inline_flag_value(flag);
            }
            "-c" | "--characters" => {
                idx += 1;
                parsed.characters = take_flag_value(args, idx, "--characters")?;
            }
            flag if flag.starts_with("--characters-file=") => {
                parsed.characters_file = inline_flag_value(flag);
            }
            "--characters-file" => {
                idx += 1;
                parsed.characters_file = take_flag_value(args, idx, "--characters-file")?;
            }
            flag if flag.starts_with("--count=") || flag.starts_with("-n=") => {
                parsed.count = Some(parse_int(&inline_flag_value(flag), "--count")?);
            }
            "-n" | "--count" => {
                idx += 1;
                let value = take_flag_value(args, idx, "--count")?;
                parsed.count = Some(parse_int(&value, "--count")?);
            }
            flag if flag.starts_with("--messages=") || flag.starts_with("-m=") => {
                parsed.messages = Some(parse_int(&inline_flag_value(flag), "--messages")?);
            }
            "-m" | "--messages" => {
                idx += 1;
                let value = take_flag_value(args, idx, "--messages")?;
                parsed.messages = Some(parse_int(&value, "--messages")?);
            }
            flag if flag.starts_with("--output-dir=") || flag.starts_with("-o=") => {
                parsed.output_dir = inline_flag_value(flag);
            }
            "-o" | "--output-dir" => {
                idx += 1;
                parsed.output_dir = take_flag_value(args, idx, "--output-dir")?;
            }
            flag if flag.starts_with("--model=") => {
                parsed.model = inline_flag_value(flag);
            }
            "--model" => {
                idx += 1;
                parsed.model = take_flag_value(args, idx, "--model")?;
            }
            flag if flag.starts_with("--retries=") => {
                parsed.retries = Some(parse_int(&inline_flag_value(flag), "--retries")?);
            }
            "--retries" => {
                idx += 1;
                let value = take_flag_value(args, idx, "--retries")?;
                parsed.retries = Some(parse_int(&value, "--retries")?);
            }
            flag if flag.starts_with("--select=") => {
                parsed.select = inline_flag_value(flag);
            }
            "--select" => {
                idx += 1;
                parsed.select = take_flag_value(args, idx, "--select")?;
            }
            flag if flag.starts_with("--seed=") => {
                parsed.seed = Some(parse_seed(&inline_flag_value(flag))?);
            }
            "--seed" => {
                idx += 1;
                let value = take_flag_value(args, idx, "--seed")?;
                parsed.seed = Some(parse_seed(&value)?);
            }
            flag if flag.starts_with('-') => {
                return Err((2, format!("unknown flag: {flag}")));
            }
            positional => {
                return Err((2, format!("unexpected argument: {positional}")));
            }
        }
        idx += 1;
    }

    let has_list = !parsed.characters.trim().is_empty();
    let has_file = !parsed.characters_file.trim().is_empty();
    if has_list && has_file {
        return Err((
            2,
            "provide either --characters or --characters-file, not both".to_string(),
        ));
    }
    if !has_list && !has_file {
        return Err((
            2,
            "one of --characters or --characters-file is required".to_string(),
        ));
    }

    match parsed.count {
        None => return Err((2, "--count is required".to_string())),
        Some(count) if count <= 0 => {
            return Err((2, "--count must be a positive integer".to_string()));
        }
        Some(_) => {}
    }
    if let Some(messages) = parsed.messages {
        if messages <= 0 {
            return Err((2, "--messages must be a positive integer".to_string()));
        }
    }
    if let Some(retries) = parsed.retries {
        if retries < 0 {
            return Err((2, "--retries must not be negative".to_string()));
        }
    }
    if !parsed.select.trim().is_empty() && SelectionPolicy::parse(&parsed.select).is_none() {
        return Err((
            2,
            format!(
                "invalid --select value {:?} (expected random or rotation)",
                parsed.select
            ),
        ));
    }

    Ok(parsed)
}

fn build_job(
    parsed: &ParsedGenerateArgs,
    backend: &dyn GeneratorBackend,
) -> Result<GenerationJob, (i32, String)> {
    let pool = if !parsed.characters.trim().is_empty() {
        CharacterPool::from_list(&parsed.characters).map_err(|e| (1, e))?
    } else {
        let text = backend
            .read_file(parsed.characters_file.trim())
            .map_err(|e| (1, format!("read characters file: {e}")))?;
        CharacterPool::from_json(&text).map_err(|e| (1, e))?
    };

    let output_dir = if parsed.output_dir.trim().is_empty() {
        PathBuf::from(DEFAULT_OUTPUT_DIR)
    } else {
        PathBuf::from(parsed.output_dir.trim())
    };
    let model = if parsed.model.trim().is_empty() {
        DEFAULT_MODEL.to_string()
    } else {
        parsed.model.trim().to_string()
    };
    let selection = SelectionPolicy::parse(&parsed.select).unwrap_or(SelectionPolicy::Random);

    Ok(GenerationJob {
        pool,
        count: parsed.count.unwrap_or_default() as usize,
        messages: parsed.messages.unwrap_or(DEFAULT_MESSAGES as i64) as usize,
        output_dir,
        model,
        retries: parsed
            .retries
            .unwrap_or(i64::from(DEFAULT_RETRY_CEILING)) as u32,
        selection,
        perturb: !parsed.perturb_off,
        seed: parsed.seed,
        verbose: parsed.verbose,
    })
}

fn take_flag_value(args: &[String], idx: usize, flag: &str) -> Result<String, (i32, String)> {
    args.get(idx)
        .cloned()
        .ok_or_else(|| (2, format!("missing value for {flag}")))
}

fn inline_flag_value(flag: &str) -> String {
    flag.split_once('=')
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

fn parse_int(value: &str, flag: &str) -> Result<i64, (i32, String)> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| (2, format!("invalid integer for {flag}: {value:?}")))
}

fn parse_seed(value: &str) -> Result<u64, (i32, String)> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| (2, format!("invalid integer for --seed: {value:?}")))
}
