//! Dictionary completeness validation.
//!
//! Compares a locale's dictionary against a reference locale (usually the
//! baseline) and reports keys that are missing, keys that changed shape, and
//! templates whose placeholders drifted during translation.

use crate::i18n::dictionary::{Dictionary, Entry};
use crate::i18n::path::resolve;
use crate::i18n::template::placeholder_regex;
use std::collections::{BTreeSet, HashSet};

/// Validation report containing errors and warnings about a dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys the candidate cannot resolve the way the reference does
    pub errors: Vec<String>,

    /// Non-critical differences
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

pub struct DictionaryValidator;

impl DictionaryValidator {
    /// Check `candidate` against `reference`.
    ///
    /// - missing leaf, or a leaf that became a sub-dictionary: error
    /// - template placeholders differ from the reference: warning
    /// - leaf present only in the candidate: warning
    pub fn validate(reference: &Dictionary, candidate: &Dictionary) -> ValidationReport {
        let mut report = ValidationReport::new();

        let reference_leaves = reference.leaves();
        for (path, expected) in &reference_leaves {
            match resolve(Some(candidate), path) {
                None => report.errors.push(format!("Missing key '{}'", path)),
                Some(Entry::Nested(_)) => report
                    .errors
                    .push(format!("Key '{}' is a dictionary, expected text", path)),
                Some(actual) => {
                    if let (Some(expected), Some(actual)) = (expected.as_text(), actual.as_text()) {
                        let want = Self::extract_placeholders(expected);
                        let got = Self::extract_placeholders(actual);
                        if want != got {
                            report.warnings.push(format!(
                                "Placeholder mismatch in '{}': reference has {:?}, translation has {:?}",
                                path, want, got
                            ));
                        }
                    }
                }
            }
        }

        let known: HashSet<&str> = reference_leaves.iter().map(|(p, _)| p.as_str()).collect();
        for (path, _) in candidate.leaves() {
            if !known.contains(path.as_str()) {
                report.warnings.push(format!("Unexpected key '{}'", path));
            }
        }

        report
    }

    /// Placeholder paths in `template`, trimmed and deduplicated.
    fn extract_placeholders(template: &str) -> BTreeSet<String> {
        placeholder_regex()
            .captures_iter(template)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
            .collect()
    }
}
