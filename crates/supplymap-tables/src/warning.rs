//! Warning types for non-fatal problems during table loading.
//!
//! When a dataset table contains a bad line, loading keeps going and the
//! problem is recorded as a [`Warning`] in a [`WarningCollector`].
//!
//! # Examples
//!
//! ```
//! use supplymap_tables::warning::{Warning, WarningCollector};
//!
//! let mut collector = WarningCollector::new();
//! collector.add(Warning::MalformedJson {
//!     line_number: 5,
//!     error: "unexpected end of input".to_string(),
//! });
//! collector.add(Warning::SkippedLine {
//!     line_number: 10,
//!     reason: "missing field `id`".to_string(),
//! });
//!
//! let warnings = collector.into_warnings();
//! assert_eq!(warnings.len(), 2);
//! ```

use std::fmt;

/// A non-fatal warning raised while loading a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A line was not valid JSON.
    MalformedJson {
        /// The 1-based line number where the error occurred.
        line_number: usize,
        /// A description of the JSON parsing error.
        error: String,
    },

    /// A line was valid JSON but could not be used.
    SkippedLine {
        /// The 1-based line number that was skipped.
        line_number: usize,
        /// The reason the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Returns a human-readable description of the warning.
    ///
    /// ```
    /// use supplymap_tables::warning::Warning;
    ///
    /// let warning = Warning::SkippedLine {
    ///     line_number: 7,
    ///     reason: "missing field `id`".to_string(),
    /// };
    /// assert_eq!(warning.description(), "line 7: skipped: missing field `id`");
    /// ```
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedJson { line_number, error } => {
                format!("line {line_number}: malformed JSON: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => {
                format!("line {line_number}: skipped: {reason}")
            }
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Warning {}

/// Accumulates warnings while a table is being loaded.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    warnings: Vec<Warning>,
}

impl WarningCollector {
    /// Creates a new empty `WarningCollector`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning to the collector.
    pub fn add(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Returns the number of warnings collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Returns `true` if no warnings have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Returns the collected warnings in the order they were added.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Consumes the collector and returns all collected warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::malformed(
        Warning::MalformedJson { line_number: 42, error: "unexpected token".to_string() },
        42,
        "malformed_json"
    )]
    #[case::skipped(
        Warning::SkippedLine { line_number: 3, reason: "missing field".to_string() },
        3,
        "skipped_line"
    )]
    fn warning_reports_line_and_kind(
        #[case] warning: Warning,
        #[case] line: usize,
        #[case] kind: &str,
    ) {
        assert_eq!(warning.line_number(), line);
        assert_eq!(warning.kind(), kind);
        assert!(warning.to_string().starts_with(&format!("line {line}:")));
    }

    #[test]
    fn collector_preserves_insertion_order() {
        let mut collector = WarningCollector::new();
        assert!(collector.is_empty());

        collector.add(Warning::SkippedLine {
            line_number: 9,
            reason: "late".to_string(),
        });
        collector.add(Warning::MalformedJson {
            line_number: 2,
            error: "early".to_string(),
        });

        assert_eq!(collector.len(), 2);
        let lines: Vec<usize> = collector.warnings().iter().map(Warning::line_number).collect();
        assert_eq!(lines, vec![9, 2]);
    }
}
