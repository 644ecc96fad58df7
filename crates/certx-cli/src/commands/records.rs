//! Records command - browse, search and export the record store.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use certx_core::{ExportFormat, RecordStore};

use super::{OutputFormat, format_records, load_config};

/// Arguments for the records command.
#[derive(Args)]
pub struct RecordsArgs {
    /// Record store (default: from config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: RecordsCommand,
}

#[derive(Subcommand)]
enum RecordsCommand {
    /// List every stored record
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Case-insensitive search across all columns
    Search {
        /// Text to look for
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Export the store as CSV or JSON
    Export(ExportArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Export format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportKind,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ExportKind {
    Csv,
    Json,
}

impl From<ExportKind> for ExportFormat {
    fn from(kind: ExportKind) -> Self {
        match kind {
            ExportKind::Csv => ExportFormat::Csv,
            ExportKind::Json => ExportFormat::Json,
        }
    }
}

pub async fn run(args: RecordsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = RecordStore::new(args.store.unwrap_or(config.store.path));

    match args.command {
        RecordsCommand::List { format } => {
            let records = store.load()?;
            print_records(&store, &records, format)
        }
        RecordsCommand::Search { query, format } => {
            let records = store.search(&query)?;
            print_records(&store, &records, format)
        }
        RecordsCommand::Export(export) => {
            let records = store.load()?;
            match &export.output {
                Some(path) => {
                    RecordStore::export(&records, export.format.into(), File::create(path)?)?;
                    eprintln!(
                        "{} Exported {} records to {}",
                        style("✓").green(),
                        records.len(),
                        path.display()
                    );
                }
                None => {
                    let stdout = io::stdout();
                    let mut lock = stdout.lock();
                    RecordStore::export(&records, export.format.into(), &mut lock)?;
                    writeln!(lock)?;
                }
            }
            Ok(())
        }
    }
}

fn print_records(
    store: &RecordStore,
    records: &[certx_core::StudentRecord],
    format: OutputFormat,
) -> anyhow::Result<()> {
    if records.is_empty() {
        eprintln!(
            "{} No records in {}",
            style("ℹ").blue(),
            store.path().display()
        );
        return Ok(());
    }

    println!("{}", format_records(records, format)?);
    eprintln!("{} {} records", style("ℹ").blue(), records.len());
    Ok(())
}
