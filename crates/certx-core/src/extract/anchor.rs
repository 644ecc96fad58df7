//! Label-anchored extraction.
//!
//! OCR output is a single noisy stream with unreliable line breaks. A field
//! is located by one of its labels; the value is the rest of that line, or
//! the next non-empty line when the rest of the line does not look like a
//! value. The value is then cut at the first stop-word, which marks where
//! the next field's label starts.

use regex::{Regex, escape};
use tracing::trace;

/// Candidates shorter than this are label residue (":" or nothing).
pub const MIN_CANDIDATE_CHARS: usize = 2;

/// A candidate containing a stop-word is treated as the next field's label
/// only when it is shorter than this; longer candidates are kept and merely
/// truncated.
pub const STOP_WORD_PROXIMITY_CHARS: usize = 15;

/// Values containing [`LABEL_FRAGMENT`] and shorter than this are a stray
/// piece of another label ("Name of"), not a value.
pub const LABEL_FRAGMENT_CHARS: usize = 10;

/// Fragment that identifies a stray label.
pub const LABEL_FRAGMENT: &str = "name of";

/// Compiled label/stop-word matcher for single-line (or next-line) values.
#[derive(Debug, Clone)]
pub struct LabelAnchor {
    label_pattern: Option<Regex>,
    stop_pattern: Option<Regex>,
}

impl LabelAnchor {
    /// Compile the label alternation and the stop-word alternation.
    ///
    /// Labels and stop-words match case-insensitively and literally, except
    /// that a blank inside a label matches any run of blanks.
    pub fn new<L, S>(labels: &[L], stop_words: &[S]) -> Result<Self, regex::Error>
    where
        L: AsRef<str>,
        S: AsRef<str>,
    {
        let label_pattern = match alternation(labels, "[^\\S\\n]+") {
            Some(labels) => Some(Regex::new(&format!(
                r"(?i)(?:{labels})[^\S\n]*[:.\-]?[^\S\n]*([^\n]*)(?:\n\s*([^\n]+))?"
            ))?),
            None => None,
        };

        let stop_pattern = match alternation(stop_words, "[^\\S\\n]+") {
            Some(stops) => Some(Regex::new(&format!("(?i)(?:{stops})"))?),
            None => None,
        };

        Ok(Self {
            label_pattern,
            stop_pattern,
        })
    }

    /// Best-guess raw value for the field, or empty when no label occurs.
    pub fn extract(&self, text: &str) -> String {
        let Some(pattern) = &self.label_pattern else {
            return String::new();
        };
        let Some(caps) = pattern.captures(text) else {
            return String::new();
        };

        let same_line = caps.get(1).map_or("", |m| m.as_str().trim());
        let next_line = caps.get(2).map_or("", |m| m.as_str().trim());

        let candidate = if !self.is_plausible(same_line) && !next_line.is_empty() {
            next_line
        } else {
            same_line
        };

        let value = self.truncate_at_stop_word(candidate);

        trace!(
            same_line,
            next_line,
            value,
            "label anchored at {}",
            caps.get(0).map_or(0, |m| m.start())
        );

        if value.to_lowercase().contains(LABEL_FRAGMENT)
            && value.chars().count() < LABEL_FRAGMENT_CHARS
        {
            return String::new();
        }

        value.to_string()
    }

    /// A candidate is implausible when it is too short, or short and
    /// containing a stop-word.
    fn is_plausible(&self, candidate: &str) -> bool {
        let len = candidate.chars().count();
        if len < MIN_CANDIDATE_CHARS {
            return false;
        }
        !(self.first_stop_word(candidate).is_some() && len < STOP_WORD_PROXIMITY_CHARS)
    }

    fn truncate_at_stop_word<'a>(&self, candidate: &'a str) -> &'a str {
        match self.first_stop_word(candidate) {
            Some(idx) => candidate[..idx].trim(),
            None => candidate,
        }
    }

    fn first_stop_word(&self, text: &str) -> Option<usize> {
        self.stop_pattern
            .as_ref()
            .and_then(|p| p.find(text))
            .map(|m| m.start())
    }
}

/// Label-anchored extraction with ad-hoc labels and stop-words.
///
/// Compiles the patterns on every call; hot paths should keep a
/// [`LabelAnchor`] (or a `FieldSpec`) around instead.
pub fn extract<L, S>(text: &str, labels: &[L], stop_words: &[S]) -> String
where
    L: AsRef<str>,
    S: AsRef<str>,
{
    match LabelAnchor::new(labels, stop_words) {
        Ok(anchor) => anchor.extract(text),
        Err(e) => {
            tracing::warn!("Could not compile label pattern: {}", e);
            String::new()
        }
    }
}

/// Escape each term, let its inner blanks match `blank`, and join the terms
/// into a regex alternation. `None` when there are no non-empty terms.
pub(crate) fn alternation<T: AsRef<str>>(terms: &[T], blank: &str) -> Option<String> {
    let parts: Vec<String> = terms
        .iter()
        .map(|t| {
            t.as_ref()
                .split_whitespace()
                .map(escape)
                .collect::<Vec<_>>()
                .join(blank)
        })
        .filter(|t| !t.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("|"))
    }
}
