//! OCR through the external `tesseract` binary.

use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::OcrBackend;

const ENGINE: &str = "tesseract";

/// Runs `tesseract <page.png> stdout -l <language>` for each page.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
    language: String,
    page_segmentation_mode: Option<u8>,
}

impl TesseractEngine {
    /// Create an engine, verifying the binary answers `--version`.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let output = Command::new(&config.tesseract_cmd)
            .arg("--version")
            .output()
            .map_err(|e| unavailable(&config.tesseract_cmd, e.to_string()))?;

        if !output.status.success() {
            return Err(unavailable(
                &config.tesseract_cmd,
                format!("--version exited with {}", output.status),
            ));
        }

        // Older releases print the version banner on stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        info!(
            "Using {}",
            String::from_utf8_lossy(&banner).lines().next().unwrap_or(ENGINE)
        );

        Ok(Self {
            command: config.tesseract_cmd.clone(),
            language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        })
    }
}

impl OcrBackend for TesseractEngine {
    fn name(&self) -> &str {
        ENGINE
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();

        let page = tempfile::Builder::new()
            .prefix("certx-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Preprocessing(format!("failed to create temp file: {}", e)))?;
        image
            .save_with_format(page.path(), ImageFormat::Png)
            .map_err(|e| OcrError::Preprocessing(format!("failed to write page image: {}", e)))?;

        let mut command = Command::new(&self.command);
        command
            .arg(page.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language);
        if let Some(psm) = self.page_segmentation_mode {
            command.arg("--psm").arg(psm.to_string());
        }

        let output = command
            .output()
            .map_err(|e| unavailable(&self.command, e.to_string()))?;

        if !output.status.success() {
            return Err(OcrError::Recognition(format!(
                "tesseract exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "tesseract returned {} chars in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

fn unavailable(command: &std::path::Path, reason: String) -> OcrError {
    OcrError::EngineUnavailable {
        engine: format!("{} ({})", ENGINE, command.display()),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let config = OcrConfig {
            tesseract_cmd: PathBuf::from("/nonexistent/tesseract"),
            ..OcrConfig::default()
        };

        let err = TesseractEngine::new(&config).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tesseract"));
    }
}
