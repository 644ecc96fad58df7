//! Configuration structures for the certificate pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration for the certx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CertxConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// Record store configuration.
    pub store: StoreConfig,
}

/// Which OCR engine turns page images into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackendKind {
    /// External `tesseract` binary.
    #[default]
    Tesseract,
    /// PaddleOCR ONNX models run in-process.
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine to use.
    pub backend: OcrBackendKind,

    /// Path (or PATH-resolved name) of the tesseract binary.
    pub tesseract_cmd: PathBuf,

    /// Tesseract language pack(s), e.g. "eng" or "eng+hin".
    pub language: String,

    /// Tesseract page segmentation mode (`--psm`), engine default if unset.
    pub page_segmentation_mode: Option<u8>,

    /// Directory with `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: PathBuf,

    /// Pages narrower than this (in pixels) are upscaled before OCR.
    pub upscale_below_width: u32,

    /// Scale factor applied to narrow pages.
    pub upscale_factor: u32,

    /// Replace `[UNK]` tokens emitted by the ONNX recognizer with spaces.
    pub strip_unknown_tokens: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendKind::Tesseract,
            tesseract_cmd: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            page_segmentation_mode: None,
            model_dir: PathBuf::from("models"),
            upscale_below_width: 1000,
            upscale_factor: 2,
            strip_unknown_tokens: true,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Use a page's embedded text layer instead of running OCR on it.
    pub prefer_embedded_text: bool,

    /// Minimum text length for a page's text layer to be trusted.
    pub min_text_length: usize,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
            max_pages: 0,
        }
    }
}

/// Field extraction configuration.
///
/// Keys are column names (`name`, `father_name`, ...). Values are merged
/// into the built-in label synonyms and stop-words once, at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Additional label synonyms per column.
    pub extra_labels: BTreeMap<String, Vec<String>>,

    /// Additional stop-words per column.
    pub extra_stop_words: BTreeMap<String, Vec<String>>,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of files processed concurrently.
    pub jobs: usize,

    /// Keep going when a file fails.
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            continue_on_error: true,
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// CSV file holding accumulated records.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output.csv"),
        }
    }
}

impl CertxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CertxConfig =
            serde_json::from_str(r#"{"ocr": {"tesseract_cmd": "/opt/tess/bin/tesseract"}}"#)
                .unwrap();

        assert_eq!(config.ocr.tesseract_cmd, PathBuf::from("/opt/tess/bin/tesseract"));
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.upscale_below_width, 1000);
        assert_eq!(config.batch.jobs, 4);
        assert_eq!(config.store.path, PathBuf::from("output.csv"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CertxConfig::default();
        config.ocr.backend = OcrBackendKind::Onnx;
        config
            .extraction
            .extra_labels
            .insert("name".to_string(), vec!["Pupil Name".to_string()]);
        config.save(&path).unwrap();

        let loaded = CertxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.backend, OcrBackendKind::Onnx);
        assert_eq!(loaded.extraction.extra_labels["name"], vec!["Pupil Name"]);
    }
}
