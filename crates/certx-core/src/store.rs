//! Tabular record store: one CSV file with the eight fixed columns.
//!
//! The store only ever grows. Files written by older or newer versions
//! (missing or extra columns) are read with missing columns backfilled as
//! empty strings, and are migrated to the current header on the next
//! append.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::models::record::{COLUMNS, StudentRecord};

/// Export formats for `records export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// CSV-backed store of extracted records.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored records in file order. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<StudentRecord>> {
        if !self.path.exists() {
            debug!("Store {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(StoreError::from)?;
        let headers = reader.headers().map_err(StoreError::from)?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(StoreError::from)?;
            records.push(StudentRecord::from_row(headers.iter(), row.iter()));
        }

        debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Append records without touching prior rows. Returns the number of
    /// rows now in the store.
    pub fn append(&self, records: &[StudentRecord]) -> Result<usize> {
        match self.header()? {
            None => {
                self.rewrite(records)?;
                Ok(records.len())
            }
            Some(header) if header == COLUMNS => {
                let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
                if !ends_with_newline(&mut file)? {
                    debug!("Terminating last row of {}", self.path.display());
                    file.write_all(b"\n")?;
                }
                let mut writer = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(file);
                for record in records {
                    writer.write_record(record.values()).map_err(StoreError::from)?;
                }
                writer.flush()?;

                debug!("Appended {} records to {}", records.len(), self.path.display());
                Ok(self.load()?.len())
            }
            Some(header) => {
                info!(
                    "Migrating {} from columns {:?}",
                    self.path.display(),
                    header
                );
                let mut all = self.load()?;
                all.extend_from_slice(records);
                self.rewrite(&all)?;
                Ok(all.len())
            }
        }
    }

    /// Records matching `query` in any column (case-insensitive substring).
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Result<Vec<StudentRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.matches(query))
            .collect())
    }

    /// Write `records` to `writer` in the given format.
    pub fn export<W: Write>(records: &[StudentRecord], format: ExportFormat, writer: W) -> Result<()> {
        match format {
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(writer);
                writer.write_record(COLUMNS).map_err(StoreError::from)?;
                for record in records {
                    writer.write_record(record.values()).map_err(StoreError::from)?;
                }
                writer.flush()?;
            }
            ExportFormat::Json => {
                serde_json::to_writer_pretty(writer, records)
                    .map_err(|e| StoreError::Export(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Header row of the existing file; `None` when there is no file or it
    /// is empty.
    fn header(&self) -> Result<Option<Vec<String>>> {
        if !self.path.exists() || fs::metadata(&self.path)?.len() == 0 {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(StoreError::from)?;
        let headers = reader.headers().map_err(StoreError::from)?;
        Ok(Some(headers.iter().map(|h| h.trim().to_string()).collect()))
    }

    /// Replace the file with `records` under the current header, through a
    /// temporary file in the same directory.
    fn rewrite(&self, records: &[StudentRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        Self::export(records, ExportFormat::Csv, temp.as_file_mut())?;

        temp.persist(&self.path).map_err(|e| StoreError::Persist {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Whether the last byte of a non-empty file is a line feed.
fn ends_with_newline(file: &mut fs::File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
