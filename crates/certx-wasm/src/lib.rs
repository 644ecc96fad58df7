//! WASM bindings for school certificate field extraction.
//!
//! OCR runs in the browser (or Node.js); these bindings turn its text into
//! student records.

use wasm_bindgen::prelude::*;

use certx_core::extract::rules::{normalize_dob, normalize_name, normalize_sex};
use certx_core::models::config::ExtractionConfig;
use certx_core::{COLUMNS, CertificateParser, Document, RecordExtractor};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract a student record from OCR text with the built-in labels.
///
/// `filename` is stored as the record's source label.
#[wasm_bindgen]
pub fn extract_record(text: &str, filename: &str) -> Result<JsValue, JsValue> {
    CertificateExtractor::new().extract(text, filename)
}

/// Column names of a record, in store order.
#[wasm_bindgen]
pub fn columns() -> js_sys::Array {
    COLUMNS.iter().map(|c| JsValue::from_str(c)).collect()
}

/// Certificate extractor class for browser use.
#[wasm_bindgen]
pub struct CertificateExtractor {
    parser: CertificateParser,
}

#[wasm_bindgen]
impl CertificateExtractor {
    /// Create an extractor with the built-in labels.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: CertificateParser::new(),
        }
    }

    /// Create an extractor with extra labels and stop-words, given as the
    /// JSON `extraction` config section:
    /// `{"extra_labels": {"name": ["Pupil Name"]}, "extra_stop_words": {}}`.
    #[wasm_bindgen]
    pub fn with_config(config_json: &str) -> Result<CertificateExtractor, JsValue> {
        let config: ExtractionConfig =
            serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let parser =
            CertificateParser::from_config(&config).map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self { parser })
    }

    /// Extract the record only.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str, filename: &str) -> Result<JsValue, JsValue> {
        let record = self.parser.extract(&Document::new(text, filename));

        serde_wasm_bindgen::to_value(&record)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Extract the record together with missing fields, the strategy that
    /// resolved each field, warnings and timing.
    #[wasm_bindgen]
    pub fn extract_with_report(&self, text: &str, filename: &str) -> Result<JsValue, JsValue> {
        let result = self.parser.parse(&Document::new(text, filename));

        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for CertificateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Field normalizers, for re-cleaning values edited by a reviewer.
#[wasm_bindgen]
pub struct CertificateUtils;

#[wasm_bindgen]
impl CertificateUtils {
    /// Canonical `DD/MM/YYYY` date, or empty.
    #[wasm_bindgen]
    pub fn normalize_dob(raw: &str) -> String {
        normalize_dob(raw)
    }

    /// Uppercase name with noise removed, or empty.
    #[wasm_bindgen]
    pub fn normalize_name(raw: &str) -> String {
        normalize_name(raw)
    }

    /// "Female", "Male" or empty.
    #[wasm_bindgen]
    pub fn normalize_sex(raw: &str) -> String {
        normalize_sex(raw)
    }
}
