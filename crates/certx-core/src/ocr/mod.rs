//! OCR backends turning page images into text.
//!
//! Two engines are available on native targets: the external `tesseract`
//! binary and PaddleOCR ONNX models run in-process by `pure-onnx-ocr`.
//! Both receive pages prepared by [`prepare_page`].

mod preprocessing;

#[cfg(feature = "native")]
mod onnx;
#[cfg(feature = "native")]
mod tesseract;

pub use preprocessing::prepare_page;

#[cfg(feature = "native")]
pub use onnx::OnnxEngine;
#[cfg(feature = "native")]
pub use tesseract::TesseractEngine;

use image::DynamicImage;

use crate::error::OcrError;
#[cfg(feature = "native")]
use crate::models::config::{OcrBackendKind, OcrConfig};

/// An engine that recognizes the text of one page image.
///
/// Implementations are shared across batch workers, so they must be
/// `Send + Sync`.
pub trait OcrBackend: Send + Sync {
    /// Engine name used in logs.
    fn name(&self) -> &str;

    /// Recognize the text of a prepared page, lines separated by `\n`.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Create the engine selected by `config.backend`.
#[cfg(feature = "native")]
pub fn create_backend(config: &OcrConfig) -> Result<Box<dyn OcrBackend>, OcrError> {
    match config.backend {
        OcrBackendKind::Tesseract => Ok(Box::new(TesseractEngine::new(config)?)),
        OcrBackendKind::Onnx => Ok(Box::new(OnnxEngine::from_dir(
            &config.model_dir,
            config.strip_unknown_tokens,
        )?)),
    }
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_create_backend_reports_missing_engine() {
        let config = OcrConfig {
            tesseract_cmd: PathBuf::from("/nonexistent/tesseract"),
            ..OcrConfig::default()
        };

        assert!(matches!(
            create_backend(&config),
            Err(OcrError::EngineUnavailable { .. })
        ));
    }

    #[test]
    fn test_create_backend_reports_missing_models() {
        let dir = tempfile::tempdir().unwrap();
        let config = OcrConfig {
            backend: OcrBackendKind::Onnx,
            model_dir: dir.path().to_path_buf(),
            ..OcrConfig::default()
        };

        assert!(matches!(
            create_backend(&config),
            Err(OcrError::ModelLoad(_))
        ));
    }
}
