//! Person name normalization (student, father, mother).

use super::patterns::{NOT_NAME_CHAR, collapse_whitespace, upper_run};

/// Normalize a raw name candidate.
///
/// Keeps the leading uppercase run, drops everything but letters, blanks and
/// periods, collapses whitespace and strips leading periods.
pub fn normalize_name(raw: &str) -> String {
    let kept = NOT_NAME_CHAR.replace_all(upper_run(raw), "");
    collapse_whitespace(&kept)
        .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

/// True when `raw` mentions one of `words` (case-insensitive).
///
/// Used to drop candidates that anchored onto institutional boilerplate
/// ("SCHOOL OF EXCELLENCE", "Certified that ...") instead of a person.
pub fn mentions_any<S: AsRef<str>>(raw: &str, words: &[S]) -> bool {
    let lowered = raw.to_lowercase();
    words
        .iter()
        .any(|w| lowered.contains(&w.as_ref().to_lowercase()))
}
