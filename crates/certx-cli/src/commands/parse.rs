//! Parse command - run field extraction on recognized text, no OCR.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use console::style;

use certx_core::{Document, RecordStore};

use super::process::print_report;
use super::{OutputFormat, build_parser, format_records, load_config};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file with OCR output, or "-" for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Source label stored in the record's filename column
    /// (default: the input file name)
    #[arg(short, long)]
    label: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the full extraction result (strategies, missing fields,
    /// warnings) instead of the record; JSON only
    #[arg(long)]
    full: bool,

    /// Show missing fields and extraction warnings
    #[arg(long)]
    report: bool,

    /// Append the record to the record store
    #[arg(long)]
    save: bool,

    /// Record store to append to (default: from config)
    #[arg(long)]
    store: Option<PathBuf>,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let parser = build_parser(&config)?;

    let from_stdin = args.input.as_os_str() == "-";
    let text = if from_stdin {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        if !args.input.exists() {
            anyhow::bail!("Input file not found: {}", args.input.display());
        }
        fs::read_to_string(&args.input)?
    };

    let label = args.label.clone().unwrap_or_else(|| {
        if from_stdin {
            "stdin".to_string()
        } else {
            args.input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        }
    });

    let result = parser.parse(&Document::new(text, label));

    if args.report {
        print_report(std::slice::from_ref(&result));
    }

    if args.full {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_records(std::slice::from_ref(&result.record), args.format)?);
    }

    if args.save {
        let store = RecordStore::new(args.store.unwrap_or(config.store.path));
        let total = store.append(std::slice::from_ref(&result.record))?;
        eprintln!(
            "{} Saved record to {} ({} total)",
            style("✓").green(),
            store.path().display(),
            total
        );
    }

    Ok(())
}
