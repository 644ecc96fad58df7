//! Sex normalization.

/// Map a raw candidate to "Female", "Male" or empty.
///
/// "female" is checked first because it contains "male".
pub fn normalize_sex(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    if lowered.contains("female") {
        "Female".to_string()
    } else if lowered.contains("male") {
        "Male".to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_female_before_male() {
        assert_eq!(normalize_sex("FEMALE"), "Female");
        assert_eq!(normalize_sex(": Male"), "Male");
        assert_eq!(normalize_sex("Boy"), "");
        assert_eq!(normalize_sex(""), "");
    }
}
