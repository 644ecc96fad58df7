//! Batch processing command for many certificate files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::{StreamExt, stream};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use certx_core::{ExtractionResult, FileKind, RecordStore, StudentRecord};

use super::{OutputFormat, build_processor, format_records, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file for all records (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of parallel workers (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Stop at the first file that fails
    #[arg(long)]
    fail_fast: bool,

    /// Append the extracted records to the record store
    #[arg(long)]
    save: bool,

    /// Record store to append to (default: from config)
    #[arg(long)]
    store: Option<PathBuf>,
}

/// Outcome of one input file.
struct DocumentOutcome {
    path: PathBuf,
    result: Result<Vec<ExtractionResult>, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", args.inputs.join(" "));
    }

    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    let fail_fast = args.fail_fast || !config.batch.continue_on_error;

    eprintln!(
        "{} Found {} files to process with {} workers",
        style("ℹ").blue(),
        files.len(),
        jobs
    );

    let processor = build_processor(&config)?;
    let total = files.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("=>-"),
    );
    pb.set_message(format!("Processed 0/{} files", total));

    let mut pending = stream::iter(files.into_iter().map(|path| {
        let processor = processor.clone();
        async move {
            let file_start = Instant::now();
            let input = path.clone();
            let result = match tokio::task::spawn_blocking(move || processor.process_file(&input)).await {
                Ok(Ok(results)) => Ok(results),
                Ok(Err(e)) => Err(e.to_string()),
                Err(e) => Err(format!("worker failed: {}", e)),
            };
            DocumentOutcome {
                path,
                result,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            }
        }
    }))
    .buffer_unordered(jobs);

    let mut outcomes = Vec::with_capacity(total);
    while let Some(outcome) = pending.next().await {
        pb.inc(1);
        pb.set_message(format!("Processed {}/{} files", pb.position(), total));

        match &outcome.result {
            Ok(results) => debug!(
                "{}: {} records in {}ms",
                outcome.path.display(),
                results.len(),
                outcome.processing_time_ms
            ),
            Err(e) if fail_fast => {
                pb.abandon();
                error!("Failed to process {}: {}", outcome.path.display(), e);
                anyhow::bail!("Processing failed for {}: {}", outcome.path.display(), e);
            }
            Err(e) => warn!("Failed to process {}: {}", outcome.path.display(), e),
        }
        outcomes.push(outcome);
    }

    pb.finish_with_message(format!("Processed {}/{} files", total, total));

    // Completion order depends on the workers
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));

    let records: Vec<StudentRecord> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .flatten()
        .map(|r| r.record.clone())
        .collect();
    let failed: Vec<&DocumentOutcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();

    let output = format_records(&records, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.save && !records.is_empty() {
        let store = RecordStore::new(args.store.clone().unwrap_or(config.store.path.clone()));
        let stored = store.append(&records)?;
        eprintln!(
            "{} Saved {} records to {} ({} total)",
            style("✓").green(),
            records.len(),
            store.path().display(),
            stored
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed, {} records",
        style(outcomes.len() - failed.len()).green(),
        style(failed.len()).red(),
        records.len()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for outcome in &failed {
            if let Err(e) = &outcome.result {
                eprintln!("  - {}: {}", outcome.path.display(), e);
            }
        }
    }

    Ok(())
}

/// Expand each input as a glob pattern (a plain path is a pattern matching
/// itself) and keep files with a supported extension.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        for path in glob(input)?.filter_map(|r| r.ok()) {
            if !path.is_file() {
                continue;
            }
            match FileKind::from_name(&path.to_string_lossy()) {
                Ok(_) => files.push(path),
                Err(_) => debug!("Skipping unsupported file {}", path.display()),
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
