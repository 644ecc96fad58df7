//! Process command - extract records from a single certificate file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use certx_core::{ExtractionResult, FileKind, RecordStore, StudentRecord};

use super::{OutputFormat, build_processor, format_records, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Append the extracted records to the record store
    #[arg(long)]
    save: bool,

    /// Record store to append to (default: from config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Show missing fields and extraction warnings
    #[arg(long)]
    report: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    FileKind::from_name(&args.input.to_string_lossy())?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Loading OCR engine...");

    let processor = build_processor(&config)?;

    pb.set_message(format!("Reading {}...", args.input.display()));
    let input = args.input.clone();
    let results = tokio::task::spawn_blocking(move || processor.process_file(&input)).await??;

    pb.finish_and_clear();

    if args.report {
        print_report(&results);
    }

    let records: Vec<StudentRecord> = results.into_iter().map(|r| r.record).collect();
    let output = format_records(&records, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.save {
        let store = RecordStore::new(args.store.unwrap_or(config.store.path));
        let total = store.append(&records)?;
        eprintln!(
            "{} Saved {} records to {} ({} total)",
            style("✓").green(),
            records.len(),
            store.path().display(),
            total
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Missing fields and warnings per page, on stderr.
pub fn print_report(results: &[ExtractionResult]) {
    for result in results {
        let found = result.resolved_by.len();
        eprintln!(
            "{} {}: {}/{} fields in {}ms",
            style("ℹ").blue(),
            result.record.filename,
            found,
            found + result.missing.len(),
            result.processing_time_ms
        );
        for (field, strategy) in &result.resolved_by {
            eprintln!("    {:<16} {}", field.to_string(), style(strategy).dim());
        }
        for warning in &result.warnings {
            eprintln!("  {} {}", style("!").yellow(), warning);
        }
    }
}
