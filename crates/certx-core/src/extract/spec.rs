//! Per-field extraction configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::anchor::{LabelAnchor, alternation};
use super::rules::{
    mentions_any, normalize_address, normalize_dob, normalize_name, normalize_register_number,
    normalize_sex,
};

/// Kind of value a field holds; decides the normalizer and how the raw
/// candidate is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFamily {
    /// Register or admission number.
    Identifier,
    /// Person name (student, father, mother).
    Name,
    Sex,
    /// Date of birth.
    Date,
    /// Multi-line postal address.
    Address,
}

impl FieldFamily {
    /// Map a raw candidate to its canonical value. Total: the worst case is
    /// an empty string.
    pub fn normalize(self, raw: &str) -> String {
        match self {
            FieldFamily::Identifier => normalize_register_number(raw),
            FieldFamily::Name => normalize_name(raw),
            FieldFamily::Sex => normalize_sex(raw),
            FieldFamily::Date => normalize_dob(raw),
            FieldFamily::Address => normalize_address(raw),
        }
    }
}

/// How the raw candidate is located in the text.
#[derive(Debug, Clone)]
enum Anchor {
    /// Rest of the label's line, or the next non-empty line.
    Line(LabelAnchor),
    /// Everything after the label up to a terminator, across lines.
    Block(Regex),
}

/// Immutable configuration of one field: label synonyms, stop-words and
/// the normalizer family. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    family: FieldFamily,
    labels: Vec<String>,
    stop_words: Vec<String>,
    reject_words: Vec<String>,
    anchor: Anchor,
}

impl FieldSpec {
    /// Compile a spec.
    ///
    /// For [`FieldFamily::Address`] the stop-words are block terminators; a
    /// newline followed by a digit always terminates the block too.
    pub fn new<L, S>(family: FieldFamily, labels: &[L], stop_words: &[S]) -> Result<Self, regex::Error>
    where
        L: AsRef<str>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        let stop_words: Vec<String> = stop_words.iter().map(|s| s.as_ref().to_string()).collect();
        let anchor = compile_anchor(family, &labels, &stop_words)?;

        Ok(Self {
            family,
            labels,
            stop_words,
            reject_words: Vec::new(),
            anchor,
        })
    }

    /// Raw candidates mentioning any of `words` are discarded.
    pub fn with_reject_words<W: AsRef<str>>(mut self, words: &[W]) -> Self {
        self.reject_words = words.iter().map(|w| w.as_ref().to_string()).collect();
        self
    }

    /// Extend labels and stop-words, recompiling the anchor.
    pub fn extended<L, S>(&self, labels: &[L], stop_words: &[S]) -> Result<Self, regex::Error>
    where
        L: AsRef<str>,
        S: AsRef<str>,
    {
        let mut merged_labels = self.labels.clone();
        merged_labels.extend(labels.iter().map(|l| l.as_ref().to_string()));
        let mut merged_stops = self.stop_words.clone();
        merged_stops.extend(stop_words.iter().map(|s| s.as_ref().to_string()));

        Ok(Self::new(self.family, &merged_labels, &merged_stops)?
            .with_reject_words(&self.reject_words))
    }

    /// Raw (pre-normalization) candidate, or empty when no label occurs.
    pub fn extract_raw(&self, text: &str) -> String {
        match &self.anchor {
            Anchor::Line(anchor) => anchor.extract(text),
            Anchor::Block(pattern) => pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().replace('\n', " "))
                .unwrap_or_default(),
        }
    }

    /// Canonical value: raw candidate, reject-word guard, then normalizer.
    pub fn resolve(&self, text: &str) -> String {
        let raw = self.extract_raw(text);
        if raw.is_empty() || mentions_any(&raw, &self.reject_words) {
            return String::new();
        }
        self.family.normalize(&raw)
    }
}

fn compile_anchor(
    family: FieldFamily,
    labels: &[String],
    stop_words: &[String],
) -> Result<Anchor, regex::Error> {
    if family != FieldFamily::Address {
        return LabelAnchor::new(labels, stop_words).map(Anchor::Line);
    }

    let labels = alternation(labels, r"\s*").unwrap_or_else(|| "Address".to_string());
    let terminators = match alternation(stop_words, r"\s*") {
        Some(stops) => format!(r"\n\d|{stops}"),
        None => r"\n\d".to_string(),
    };
    Regex::new(&format!(
        r"(?is)(?:{labels})\s*[:.\-]?\s*(.+?)(?:{terminators})"
    ))
    .map(Anchor::Block)
}

/// Label synonyms and stop-words of the built-in field configuration.
pub mod defaults {
    pub const REGISTER_LABELS: &[&str] =
        &["Register Number", "Reg. No", "Reg No", "Admission No"];
    pub const REGISTER_STOPS: &[&str] = &["Name", "Date", "Sex"];

    pub const NAME_LABELS: &[&str] = &[
        "Name of Candidate",
        "Name of Student",
        "Name",
        "Nume",
        "Nome",
        "Candidate Name",
    ];
    pub const NAME_STOPS: &[&str] = &[
        "Date",
        "Sex",
        "Male",
        "Female",
        "Name of Father",
        "Father",
        "Religion",
        "Caste",
    ];
    /// Words that show the name anchor landed on certificate boilerplate.
    pub const NAME_REJECT: &[&str] = &["school", "certified", "guardian", "headmaster"];

    pub const SEX_LABELS: &[&str] = &["Sex", "Gender", "Male", "Female"];
    pub const SEX_STOPS: &[&str] = &["Date", "Nationality", "Religion", "Caste"];

    /// Includes common OCR misreadings of "Date of Birth".
    pub const DOB_LABELS: &[&str] = &["Date of Birth", "DOB", "Dale of Birth", "Date of Bith"];
    pub const DOB_STOPS: &[&str] = &["Male", "Female", "Sex", "Father"];

    pub const FATHER_LABELS: &[&str] = &["Name of Father", "Father Name", "Father's Name", "Father"];
    pub const FATHER_STOPS: &[&str] = &["Mother", "Guardian", "Address", "Occupation", "Mother's"];

    pub const MOTHER_LABELS: &[&str] = &["Name of Mother", "Mother Name", "Mother's Name", "Mother"];
    pub const MOTHER_STOPS: &[&str] = &["Guardian", "Address", "Occupation", "Place"];

    pub const ADDRESS_LABELS: &[&str] = &["Address", "Permanent Address"];
    pub const ADDRESS_TERMINATORS: &[&str] = &["Identification", "Marks", "Headmaster"];
}
