//! Register / admission number normalization.

use super::patterns::DIGIT_RUN;

/// First run of digits in `raw`, with single blanks inside the run removed
/// ("12 345" -> "12345"). Empty when `raw` has no digits.
pub fn normalize_register_number(raw: &str) -> String {
    DIGIT_RUN
        .find(raw)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_runs() {
        assert_eq!(normalize_register_number("12345"), "12345");
        assert_eq!(normalize_register_number(": 12 345 dated"), "12345");
        assert_eq!(normalize_register_number("No. 77 of  2003"), "77");
        assert_eq!(normalize_register_number("none"), "");
    }
}
