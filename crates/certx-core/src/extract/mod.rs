//! Certificate field extraction module.

mod anchor;
mod parser;
pub mod rules;
pub mod spec;
pub mod strategy;

pub use anchor::{
    LABEL_FRAGMENT, LABEL_FRAGMENT_CHARS, LabelAnchor, MIN_CANDIDATE_CHARS,
    STOP_WORD_PROXIMITY_CHARS, extract,
};
pub use parser::{CertificateParser, ExtractionResult};
pub use spec::{FieldFamily, FieldSpec};
pub use strategy::{FieldPlan, Strategy};

use crate::models::record::{Document, StudentRecord};

/// Trait for certificate record extractors.
///
/// Extraction is total: a document without recognizable fields yields a
/// record whose extracted columns are all empty.
pub trait RecordExtractor {
    /// Extract a record from one OCR'd page.
    fn extract(&self, document: &Document) -> StudentRecord;
}
