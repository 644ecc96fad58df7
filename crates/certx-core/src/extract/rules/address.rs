//! Address normalization.

use super::patterns::{DIGITS, NOT_ADDRESS_CHAR, collapse_whitespace, upper_run};

/// Normalize a raw address block.
///
/// Keeps the leading uppercase run, removes digits (house and pin numbers
/// are too noisy to keep), turns punctuation into blanks and collapses
/// whitespace.
pub fn normalize_address(raw: &str) -> String {
    let without_digits = DIGITS.replace_all(upper_run(raw), "");
    let letters = NOT_ADDRESS_CHAR.replace_all(&without_digits, " ");
    collapse_whitespace(&letters)
}
