//! Common regex patterns for certificate field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Register number: "Register No", "Reg. Number", "REG NO:-" ...
    pub static ref REGISTER_NUMBER: Regex = Regex::new(
        r"(?i)(?:Register|Reg)\.?\s*(?:Number|No)\.?\s*[:.\-]?\s*(\d{3,})"
    ).unwrap();

    pub static ref ADMISSION_NUMBER: Regex = Regex::new(
        r"(?i)Admission\s*No\.?\s*[:.\-]?\s*(\d+)"
    ).unwrap();

    // Digits, optionally split by single blanks ("12 345")
    pub static ref DIGIT_RUN: Regex = Regex::new(
        r"\d(?:[ \t]?\d)*"
    ).unwrap();

    // Bare date shape searched over the whole text: D{1,2} sep D{1,2} sep D{4}
    pub static ref DATE_SHAPE: Regex = Regex::new(
        r"(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{4})"
    ).unwrap();

    // Same shape inside a labeled candidate, tolerating blanks around separators
    pub static ref DATE_SPACED: Regex = Regex::new(
        r"(\d{1,2})[^\S\n]*[/\-.][^\S\n]*(\d{1,2})[^\S\n]*[/\-.][^\S\n]*(\d{4})"
    ).unwrap();

    // Standalone sex tokens for the whole-text scan
    pub static ref FEMALE_TOKEN: Regex = Regex::new(r"(?i)\bFemale\b").unwrap();
    pub static ref MALE_TOKEN: Regex = Regex::new(r"(?i)\bMale\b").unwrap();

    // Cleanup
    pub static ref FIRST_LOWERCASE: Regex = Regex::new(r"[a-z]").unwrap();
    pub static ref NOT_NAME_CHAR: Regex = Regex::new(r"[^a-zA-Z\s.]").unwrap();
    pub static ref NOT_ADDRESS_CHAR: Regex = Regex::new(r"[^a-zA-Z\s]").unwrap();
    pub static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Cut `text` right before the first ASCII lowercase letter.
///
/// Certificates print names and addresses in capitals; lowercase text is
/// OCR noise or the start of the next field.
pub fn upper_run(text: &str) -> &str {
    match FIRST_LOWERCASE.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_number_variants() {
        for text in [
            "Register No: 12345",
            "Reg. No.- 12345",
            "REGISTER NUMBER 12345",
            "reg no:12345",
        ] {
            let caps = REGISTER_NUMBER.captures(text).unwrap();
            assert_eq!(&caps[1], "12345", "input: {text}");
        }

        // Fewer than three digits is not a register number
        assert!(REGISTER_NUMBER.captures("Reg No: 12").is_none());
    }

    #[test]
    fn test_date_shape_separators() {
        for text in ["14/02/2005", "14-02-2005", "14.02.2005", "4/2/2005"] {
            assert!(DATE_SHAPE.is_match(text), "input: {text}");
        }
        assert!(!DATE_SHAPE.is_match("14/02/05"));
    }

    #[test]
    fn test_upper_run() {
        assert_eq!(upper_run("RAVI KUMAR son of"), "RAVI KUMAR ");
        assert_eq!(upper_run("RAVI"), "RAVI");
        assert_eq!(upper_run("ravi"), "");
    }
}
