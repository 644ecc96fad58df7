//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod parse;
pub mod process;
pub mod records;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use tracing::{debug, warn};

use certx_core::models::config::CertxConfig;
use certx_core::{COLUMNS, CertificateParser, DocumentProcessor, StudentRecord, create_backend};

/// Output format for extracted records.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output with the store's eight columns
    Csv,
    /// Plain text, one block per record
    Text,
}

/// Default configuration file under the platform config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("certx")
        .join("config.json")
}

/// Load the configuration from `--config`, else from the default file when
/// it exists, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<CertxConfig> {
    if let Some(path) = path {
        return Ok(CertxConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config {}", default_path.display());
        Ok(CertxConfig::from_file(&default_path)?)
    } else {
        Ok(CertxConfig::default())
    }
}

/// Parser with the configured label and stop-word extensions.
pub fn build_parser(config: &CertxConfig) -> anyhow::Result<CertificateParser> {
    Ok(CertificateParser::from_config(&config.extraction)?)
}

/// Processor for files. A missing OCR engine is not fatal here: PDFs with a
/// text layer still work, and image inputs fail individually.
pub fn build_processor(config: &CertxConfig) -> anyhow::Result<DocumentProcessor> {
    let processor = DocumentProcessor::new(
        build_parser(config)?,
        config.ocr.clone(),
        config.pdf.clone(),
    );

    match create_backend(&config.ocr) {
        Ok(backend) => Ok(processor.with_ocr(Arc::from(backend))),
        Err(e) => {
            warn!("{}", e);
            eprintln!(
                "{} OCR unavailable, only PDFs with a text layer can be read: {}",
                style("!").yellow(),
                e
            );
            Ok(processor)
        }
    }
}

pub fn format_records(records: &[StudentRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(COLUMNS)?;
            for record in records {
                wtr.write_record(record.values())?;
            }
            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => Ok(records
            .iter()
            .map(format_record_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn format_record_text(record: &StudentRecord) -> String {
    let mut output = String::new();
    for (column, value) in COLUMNS.iter().zip(record.values()) {
        let value = if value.is_empty() { "-" } else { value };
        output.push_str(&format!("{:<16} {}\n", format!("{}:", column), value));
    }
    output
}
