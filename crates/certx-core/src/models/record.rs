//! Student record model: the flat eight-column output of extraction.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names of the tabular store, in their fixed order.
pub const COLUMNS: [&str; 8] = [
    "filename",
    "register_number",
    "name",
    "sex",
    "dob",
    "father_name",
    "mother_name",
    "address",
];

/// Canonical date of birth format produced by the date normalizer.
pub const DOB_FORMAT: &str = "%d/%m/%Y";

/// One column of a [`StudentRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Filename,
    RegisterNumber,
    Name,
    Sex,
    Dob,
    FatherName,
    MotherName,
    Address,
}

impl Field {
    /// All columns in store order.
    pub const ALL: [Field; 8] = [
        Field::Filename,
        Field::RegisterNumber,
        Field::Name,
        Field::Sex,
        Field::Dob,
        Field::FatherName,
        Field::MotherName,
        Field::Address,
    ];

    /// Columns resolved from document text (everything except `filename`).
    pub const EXTRACTED: [Field; 7] = [
        Field::RegisterNumber,
        Field::Name,
        Field::Sex,
        Field::Dob,
        Field::FatherName,
        Field::MotherName,
        Field::Address,
    ];

    /// Column name in the tabular store.
    pub fn column(self) -> &'static str {
        COLUMNS[self as usize]
    }

    /// Look up a field by its column name (case-insensitive, surrounding
    /// whitespace ignored).
    pub fn from_column(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.column().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A single page of OCR output together with the label of its source.
///
/// Created once per OCR pass and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    label: String,
}

impl Document {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    /// Raw OCR text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// File name (or `<file>_page_<n>` for multi-page sources).
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Extracted identity fields of one certificate page.
///
/// Every column is always present; information that could not be found is
/// an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentRecord {
    pub filename: String,
    pub register_number: String,
    pub name: String,
    pub sex: String,
    pub dob: String,
    pub father_name: String,
    pub mother_name: String,
    pub address: String,
}

impl StudentRecord {
    /// Create an empty record for the given source label.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Filename => &self.filename,
            Field::RegisterNumber => &self.register_number,
            Field::Name => &self.name,
            Field::Sex => &self.sex,
            Field::Dob => &self.dob,
            Field::FatherName => &self.father_name,
            Field::MotherName => &self.mother_name,
            Field::Address => &self.address,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Filename => &mut self.filename,
            Field::RegisterNumber => &mut self.register_number,
            Field::Name => &mut self.name,
            Field::Sex => &mut self.sex,
            Field::Dob => &mut self.dob,
            Field::FatherName => &mut self.father_name,
            Field::MotherName => &mut self.mother_name,
            Field::Address => &mut self.address,
        };
        *slot = value.into();
    }

    /// Values in [`COLUMNS`] order.
    pub fn values(&self) -> [&str; 8] {
        Field::ALL.map(|f| self.get(f))
    }

    /// Build a record from a row of some (possibly older or newer) schema.
    ///
    /// Columns missing from `headers` stay empty and unknown columns are
    /// ignored.
    pub fn from_row<'a, H, V>(headers: H, values: V) -> Self
    where
        H: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        let mut record = Self::default();
        for (header, value) in headers.into_iter().zip(values) {
            if let Some(field) = Field::from_column(header) {
                record.set(field, value);
            }
        }
        record
    }

    /// Extracted columns that are still empty.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::EXTRACTED
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }

    /// Case-insensitive substring match against every column.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.values()
            .iter()
            .any(|v| v.to_lowercase().contains(&query))
    }

    /// Date of birth as a calendar date, when it is one.
    pub fn dob_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.dob, DOB_FORMAT).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_columns_follow_store_order() {
        let columns: Vec<&str> = Field::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(columns, COLUMNS.to_vec());
        assert_eq!(Field::from_column(" Father_Name "), Some(Field::FatherName));
        assert_eq!(Field::from_column("religion"), None);
    }

    #[test]
    fn test_from_row_backfills_missing_columns() {
        let record = StudentRecord::from_row(
            ["filename", "name", "caste"],
            ["cert.png", "RAVI KUMAR", "ignored"],
        );

        assert_eq!(record.filename, "cert.png");
        assert_eq!(record.name, "RAVI KUMAR");
        assert_eq!(record.address, "");
        assert_eq!(record.values().len(), 8);
    }

    #[test]
    fn test_missing_fields_excludes_filename() {
        let mut record = StudentRecord::new("a.png");
        record.set(Field::Sex, "Male");

        let missing = record.missing_fields();
        assert_eq!(missing.len(), 6);
        assert!(!missing.contains(&Field::Sex));
        assert!(!missing.contains(&Field::Filename));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let mut record = StudentRecord::new("scan_01.jpg");
        record.name = "ANITHA".to_string();

        assert!(record.matches("anitha"));
        assert!(record.matches("SCAN_01"));
        assert!(record.matches(""));
        assert!(!record.matches("ravi"));
    }

    #[test]
    fn test_dob_date() {
        let mut record = StudentRecord::default();
        record.dob = "14/02/2005".to_string();
        assert_eq!(record.dob_date(), NaiveDate::from_ymd_opt(2005, 2, 14));

        record.dob = "31/02/2005".to_string();
        assert_eq!(record.dob_date(), None);
    }

    #[test]
    fn test_json_without_columns_deserializes_to_empty_strings() {
        let record: StudentRecord = serde_json::from_str(r#"{"name":"ANITHA"}"#).unwrap();
        assert_eq!(record.name, "ANITHA");
        assert_eq!(record.dob, "");
    }
}
