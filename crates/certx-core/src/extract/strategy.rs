//! Ordered fallback chains per field.
//!
//! Each field resolves through a list of strategies evaluated in order; the
//! first non-empty canonical value wins.

use regex::Regex;

use crate::models::record::Field;

use super::spec::{FieldFamily, FieldSpec};

/// One way of resolving a field from the whole document text.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Search the whole text with a rigid pattern; capture group 1 (or the
    /// whole match) goes through the family normalizer.
    Direct {
        pattern: &'static Regex,
        family: FieldFamily,
    },

    /// Label-anchored extraction followed by the spec's normalizer.
    Anchored(FieldSpec),

    /// Word-boundary scan for standalone tokens; the first pattern that
    /// matches anywhere yields its canonical value.
    TokenScan(Vec<(&'static Regex, &'static str)>),
}

impl Strategy {
    /// Short name used in logs and extraction reports.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Direct { .. } => "direct",
            Strategy::Anchored(_) => "anchored",
            Strategy::TokenScan(_) => "token_scan",
        }
    }

    /// Canonical value found by this strategy, or empty.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Strategy::Direct { pattern, family } => pattern
                .captures(text)
                .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| family.normalize(m.as_str()))
                .unwrap_or_default(),
            Strategy::Anchored(spec) => spec.resolve(text),
            Strategy::TokenScan(tokens) => tokens
                .iter()
                .find(|(pattern, _)| pattern.is_match(text))
                .map(|(_, value)| value.to_string())
                .unwrap_or_default(),
        }
    }
}

/// A field together with its ordered strategies.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    field: Field,
    strategies: Vec<Strategy>,
}

impl FieldPlan {
    pub fn new(field: Field, strategies: Vec<Strategy>) -> Self {
        Self { field, strategies }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub(crate) fn strategies_mut(&mut self) -> &mut [Strategy] {
        &mut self.strategies
    }

    /// First non-empty value and the strategy that produced it.
    pub fn resolve(&self, text: &str) -> Option<(String, &'static str)> {
        self.strategies.iter().find_map(|strategy| {
            let value = strategy.apply(text);
            (!value.is_empty()).then(|| (value, strategy.name()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::rules::patterns::{DATE_SHAPE, FEMALE_TOKEN, MALE_TOKEN};
    use crate::extract::spec::defaults::{DOB_LABELS, DOB_STOPS};

    fn dob_plan() -> FieldPlan {
        FieldPlan::new(
            Field::Dob,
            vec![
                Strategy::Direct {
                    pattern: &*DATE_SHAPE,
                    family: FieldFamily::Date,
                },
                Strategy::Anchored(
                    FieldSpec::new(FieldFamily::Date, DOB_LABELS, DOB_STOPS).unwrap(),
                ),
            ],
        )
    }

    #[test]
    fn test_first_non_empty_wins() {
        let plan = dob_plan();
        let text = "Date of Birth: garbled\nIssued 14/02/2005";

        assert_eq!(
            plan.resolve(text),
            Some(("14/02/2005".to_string(), "direct"))
        );
    }

    #[test]
    fn test_falls_through_to_later_strategy() {
        let plan = dob_plan();
        let text = "Date of Birth: 14 - 02 - 2005";

        assert_eq!(
            plan.resolve(text),
            Some(("14/02/2005".to_string(), "anchored"))
        );
    }

    #[test]
    fn test_all_empty_is_none() {
        assert_eq!(dob_plan().resolve("nothing here"), None);
    }

    #[test]
    fn test_token_scan_order() {
        let scan = Strategy::TokenScan(vec![(&*FEMALE_TOKEN, "Female"), (&*MALE_TOKEN, "Male")]);

        assert_eq!(scan.apply("Male students and one Female"), "Female");
        assert_eq!(scan.apply("MALE"), "Male");
        assert_eq!(scan.apply("Females"), "");
    }
}
