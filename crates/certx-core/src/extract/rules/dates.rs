//! Date of birth normalization.

use super::patterns::DATE_SPACED;

/// Find a `D{1,2} sep D{1,2} sep D{4}` date in `raw` and render it as
/// `DD/MM/YYYY` with the digits as written. Returns empty when there is
/// no complete date; partial dates are not repaired.
pub fn normalize_dob(raw: &str) -> String {
    DATE_SPACED
        .captures(raw)
        .map(|caps| format!("{}/{}/{}", &caps[1], &caps[2], &caps[3]))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_normalized() {
        assert_eq!(normalize_dob("14-02-2005"), "14/02/2005");
        assert_eq!(normalize_dob("14.02.2005"), "14/02/2005");
        assert_eq!(normalize_dob("born on 4/2/2005 at"), "4/2/2005");
    }

    #[test]
    fn test_spacing_noise() {
        assert_eq!(normalize_dob("14 - 02 - 2005"), "14/02/2005");
    }

    #[test]
    fn test_incomplete_dates_are_empty() {
        assert_eq!(normalize_dob("14/02"), "");
        assert_eq!(normalize_dob("garbled"), "");
        assert_eq!(normalize_dob("14/02/05"), "");
        assert_eq!(normalize_dob(""), "");
    }
}
