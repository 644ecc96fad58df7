//! Record assembly: per-field strategy selection over one document.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CertxError;
use crate::models::config::ExtractionConfig;
use crate::models::record::{Document, Field, StudentRecord};

use super::RecordExtractor;
use super::rules::patterns::*;
use super::spec::defaults::*;
use super::spec::{FieldFamily, FieldSpec};
use super::strategy::{FieldPlan, Strategy};

/// Result of extracting one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted record; every column present, unmatched ones empty.
    pub record: StudentRecord,
    /// Extracted columns that stayed empty.
    pub missing: Vec<Field>,
    /// Strategy that produced each non-empty column.
    pub resolved_by: BTreeMap<Field, &'static str>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Rule-based certificate parser.
///
/// Holds one [`FieldPlan`] per extracted column. Plans are immutable after
/// construction, so one parser can serve any number of threads.
#[derive(Debug, Clone)]
pub struct CertificateParser {
    plans: Vec<FieldPlan>,
}

impl CertificateParser {
    /// Create a parser with the built-in field configuration.
    pub fn new() -> Self {
        Self {
            plans: default_plans(),
        }
    }

    /// Create a parser with configured label and stop-word extensions.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, CertxError> {
        let mut parser = Self::new();
        let empty: Vec<String> = Vec::new();

        let columns: BTreeSet<&String> = config
            .extra_labels
            .keys()
            .chain(config.extra_stop_words.keys())
            .collect();

        for column in columns {
            let field = Field::from_column(column)
                .filter(|f| *f != Field::Filename)
                .ok_or_else(|| {
                    CertxError::Config(format!("unknown extraction column: {column}"))
                })?;

            let labels = config.extra_labels.get(column).unwrap_or(&empty);
            let stops = config.extra_stop_words.get(column).unwrap_or(&empty);
            parser.extend_field(field, labels, stops)?;
        }

        Ok(parser)
    }

    fn extend_field(
        &mut self,
        field: Field,
        labels: &[String],
        stop_words: &[String],
    ) -> Result<(), CertxError> {
        let plan = self
            .plans
            .iter_mut()
            .find(|p| p.field() == field)
            .ok_or_else(|| CertxError::Config(format!("no extraction plan for {field}")))?;

        for strategy in plan.strategies_mut() {
            if let Strategy::Anchored(spec) = strategy {
                *spec = spec
                    .extended(labels, stop_words)
                    .map_err(|e| CertxError::Config(format!("{field}: {e}")))?;
            }
        }

        debug!(
            "Extended {} with {} labels and {} stop-words",
            field,
            labels.len(),
            stop_words.len()
        );
        Ok(())
    }

    /// Extract a record and an extraction report from one document.
    pub fn parse(&self, document: &Document) -> ExtractionResult {
        let start = Instant::now();
        let text = document.text();
        let mut record = StudentRecord::new(document.label());
        let mut resolved_by = BTreeMap::new();
        let mut warnings = Vec::new();

        info!(
            "Parsing {} from {} characters of text",
            document.label(),
            text.len()
        );

        for plan in &self.plans {
            match plan.resolve(text) {
                Some((value, strategy)) => {
                    debug!("{} resolved by {}: {:?}", plan.field(), strategy, value);
                    record.set(plan.field(), value);
                    resolved_by.insert(plan.field(), strategy);
                }
                None => debug!("{} not found", plan.field()),
            }
        }

        if !record.dob.is_empty() && record.dob_date().is_none() {
            warnings.push(format!("dob {} is not a calendar date", record.dob));
        }

        let missing = record.missing_fields();
        for field in &missing {
            warnings.push(format!("Could not extract {field}"));
        }

        debug!(
            "Extracted {} with {} of {} fields",
            document.label(),
            Field::EXTRACTED.len() - missing.len(),
            Field::EXTRACTED.len()
        );

        ExtractionResult {
            record,
            missing,
            resolved_by,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for CertificateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordExtractor for CertificateParser {
    fn extract(&self, document: &Document) -> StudentRecord {
        self.parse(document).record
    }
}

fn builtin_spec(family: FieldFamily, labels: &[&str], stop_words: &[&str]) -> FieldSpec {
    // Built-in labels are escaped literals; compiling them cannot fail.
    FieldSpec::new(family, labels, stop_words).unwrap()
}

fn anchored(family: FieldFamily, labels: &[&str], stop_words: &[&str]) -> Strategy {
    Strategy::Anchored(builtin_spec(family, labels, stop_words))
}

/// Built-in fallback chains.
///
/// Register number and dob try rigid whole-text patterns before any label,
/// since OCR misreads labels more often than digits. Sex falls back to a
/// standalone token anywhere in the text.
fn default_plans() -> Vec<FieldPlan> {
    vec![
        FieldPlan::new(
            Field::RegisterNumber,
            vec![
                Strategy::Direct {
                    pattern: &*REGISTER_NUMBER,
                    family: FieldFamily::Identifier,
                },
                Strategy::Direct {
                    pattern: &*ADMISSION_NUMBER,
                    family: FieldFamily::Identifier,
                },
                anchored(FieldFamily::Identifier, REGISTER_LABELS, REGISTER_STOPS),
            ],
        ),
        FieldPlan::new(
            Field::Name,
            vec![Strategy::Anchored(
                builtin_spec(FieldFamily::Name, NAME_LABELS, NAME_STOPS)
                    .with_reject_words(NAME_REJECT),
            )],
        ),
        FieldPlan::new(
            Field::Sex,
            vec![
                anchored(FieldFamily::Sex, SEX_LABELS, SEX_STOPS),
                Strategy::TokenScan(vec![(&*FEMALE_TOKEN, "Female"), (&*MALE_TOKEN, "Male")]),
            ],
        ),
        FieldPlan::new(
            Field::Dob,
            vec![
                Strategy::Direct {
                    pattern: &*DATE_SHAPE,
                    family: FieldFamily::Date,
                },
                anchored(FieldFamily::Date, DOB_LABELS, DOB_STOPS),
            ],
        ),
        FieldPlan::new(
            Field::FatherName,
            vec![anchored(FieldFamily::Name, FATHER_LABELS, FATHER_STOPS)],
        ),
        FieldPlan::new(
            Field::MotherName,
            vec![anchored(FieldFamily::Name, MOTHER_LABELS, MOTHER_STOPS)],
        ),
        FieldPlan::new(
            Field::Address,
            vec![anchored(FieldFamily::Address, ADDRESS_LABELS, ADDRESS_TERMINATORS)],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> StudentRecord {
        CertificateParser::new().extract(&Document::new(text, "test.png"))
    }

    const TRANSFER_CERTIFICATE: &str = r#"GOVERNMENT HIGHER SECONDARY SCHOOL
TRANSFER CERTIFICATE
Register No: 40217
Name of Student: PRIYA DHARSHINI
Sex: Female
Date of Birth: 07-11-2006
Name of Father: MURUGESAN K
Name of Mother: LAKSHMI M
Address: 14, NEHRU STREET,
VELLORE
9. Identification Marks: A MOLE ON THE LEFT HAND
Headmaster"#;

    #[test]
    fn test_parse_full_certificate() {
        let record = parse(TRANSFER_CERTIFICATE);

        assert_eq!(
            record,
            StudentRecord {
                filename: "test.png".to_string(),
                register_number: "40217".to_string(),
                name: "PRIYA DHARSHINI".to_string(),
                sex: "Female".to_string(),
                dob: "07/11/2006".to_string(),
                father_name: "MURUGESAN K".to_string(),
                mother_name: "LAKSHMI M".to_string(),
                address: "NEHRU STREET VELLORE".to_string(),
            }
        );
    }

    #[test]
    fn test_register_number() {
        let record = parse("Register No: 12345\nName: Ravi Kumar");
        assert_eq!(record.register_number, "12345");
    }

    #[test]
    fn test_register_number_admission_fallback() {
        assert_eq!(parse("Admission No. 987").register_number, "987");
        assert_eq!(parse("Admission No: 98 7\nName").register_number, "98");
    }

    #[test]
    fn test_register_number_label_fallback() {
        // Two digits fail the direct pattern; the label anchor still finds it.
        assert_eq!(parse("Reg No: 42\nName: X").register_number, "42");
        assert_eq!(parse("Reg. No: 42\nName: X").register_number, "42");
    }

    #[test]
    fn test_bare_date_beats_labeled_garbage() {
        let record = parse("Date of Birth: garbled\nIssued on 14/02/2005");
        assert_eq!(record.dob, "14/02/2005");
    }

    #[test]
    fn test_dotted_date_normalized() {
        assert_eq!(parse("DOB 01.06.2004").dob, "01/06/2004");
    }

    #[test]
    fn test_name_stop_word_truncation() {
        let record = parse("Name: RAVI KUMAR Sex: Male");
        assert_eq!(record.name, "RAVI KUMAR");
        assert_eq!(record.sex, "Male");
    }

    #[test]
    fn test_label_only_line_resolves_empty_name() {
        let record = parse("Name:\nSex: Male");
        assert_eq!(record.name, "");
    }

    #[test]
    fn test_sex_whole_text_fallback() {
        let record = parse("Student is a Female candidate of this institution");
        assert_eq!(record.sex, "Female");
    }

    #[test]
    fn test_name_boilerplate_rejected() {
        let record = parse("Name: SCHOOL OF EXCELLENCE\nRegister No: 555");
        assert_eq!(record.name, "");
        assert_eq!(record.register_number, "555");
    }

    #[test]
    fn test_empty_text_gives_complete_empty_record() {
        let result = CertificateParser::new().parse(&Document::new("", "blank.png"));

        assert_eq!(result.record, StudentRecord::new("blank.png"));
        assert_eq!(result.missing, Field::EXTRACTED.to_vec());
        assert_eq!(result.warnings.len(), Field::EXTRACTED.len());
        assert!(result.resolved_by.is_empty());
    }

    #[test]
    fn test_stop_words_only_text() {
        let record = parse("Date Sex Male Female Father Mother Guardian Address Religion Caste");
        assert_eq!(record.name, "");
        assert_eq!(record.father_name, "");
        assert_eq!(record.mother_name, "");
    }

    #[test]
    fn test_resolved_by_and_calendar_warning() {
        let result = CertificateParser::new()
            .parse(&Document::new("Date of Birth: 31/02/2005\nGender: Male", "x"));

        assert_eq!(result.record.dob, "31/02/2005");
        assert_eq!(result.resolved_by[&Field::Dob], "direct");
        assert_eq!(result.resolved_by[&Field::Sex], "anchored");
        assert!(result.warnings.iter().any(|w| w.contains("not a calendar date")));
    }

    #[test]
    fn test_from_config_extends_labels() {
        let mut config = ExtractionConfig::default();
        config
            .extra_labels
            .insert("name".to_string(), vec!["Pupil's Name".to_string()]);
        config
            .extra_stop_words
            .insert("name".to_string(), vec!["Roll".to_string()]);

        let parser = CertificateParser::from_config(&config).unwrap();
        let record = parser.extract(&Document::new("Pupil's Name: ARUN V Roll No 17", "x"));

        assert_eq!(record.name, "ARUN V");
    }

    #[test]
    fn test_from_config_rejects_unknown_column() {
        let mut config = ExtractionConfig::default();
        config
            .extra_labels
            .insert("religion".to_string(), vec!["Faith".to_string()]);

        assert!(matches!(
            CertificateParser::from_config(&config),
            Err(CertxError::Config(_))
        ));
    }

    #[test]
    fn test_parser_is_shareable_across_threads() {
        let parser = std::sync::Arc::new(CertificateParser::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let parser = parser.clone();
                std::thread::spawn(move || {
                    let text = format!("Register No: 1000{i}\nSex: Male");
                    parser.extract(&Document::new(text, format!("{i}.png")))
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let record = handle.join().unwrap();
            assert_eq!(record.register_number, format!("1000{i}"));
            assert_eq!(record.filename, format!("{i}.png"));
        }
    }
}
