//! Core library for school certificate OCR processing.
//!
//! This crate provides:
//! - Field extraction from noisy OCR text (register number, name, sex,
//!   date of birth, parent names, address)
//! - PDF page handling (embedded text layer or embedded scan images)
//! - OCR backends (external Tesseract binary, pure Rust ONNX models)
//! - The flat eight-column record store

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
#[cfg(feature = "native")]
pub mod store;

pub use error::{CertxError, Result};
pub use extract::{CertificateParser, ExtractionResult, FieldFamily, FieldSpec, RecordExtractor};
pub use models::config::CertxConfig;
pub use models::record::{COLUMNS, Document, Field, StudentRecord};
pub use ocr::{OcrBackend, prepare_page};
#[cfg(feature = "native")]
pub use ocr::{OnnxEngine, TesseractEngine, create_backend};
pub use pdf::{PdfExtractor, PdfPage, PdfProcessor, PdfType};
pub use pipeline::{DocumentProcessor, FileKind};
#[cfg(feature = "native")]
pub use store::{ExportFormat, RecordStore};
