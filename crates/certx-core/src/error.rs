//! Error types for the certx-core library.
//!
//! Field extraction itself never fails (a field that cannot be found is an
//! empty string). These errors belong to the collaborators around it: PDF
//! handling, OCR backends, the record store and configuration.

use thiserror::Error;

/// Main error type for the certx library.
#[derive(Error, Debug)]
pub enum CertxError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file extension is not one we know how to process.
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// A page has neither a text layer nor a decodable scan image.
    #[error("page {0} has no text and no decodable image")]
    EmptyPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The configured OCR engine could not be started.
    #[error("OCR engine unavailable ({engine}): {reason}")]
    EngineUnavailable { engine: String, reason: String },

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The engine ran but did not produce text.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Image preparation for the engine failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),
}

/// Errors related to the tabular record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The CSV file could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The store file could not be replaced atomically.
    #[error("failed to persist {path}: {reason}")]
    Persist { path: String, reason: String },

    /// Records could not be serialized for export.
    #[error("export failed: {0}")]
    Export(String),
}

/// Result type for the certx library.
pub type Result<T> = std::result::Result<T, CertxError>;
