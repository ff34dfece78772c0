//! Per-call accumulator of validation findings
//!
//! A `Report` is created fresh for every `validate()` invocation and
//! never shared across calls. Its two configuration axes, strategy and
//! strictness, are fixed at construction: `failfast` aborts on the
//! first error-severity finding by returning it from `add`, `delayed`
//! collects everything and raises one aggregated failure from
//! `summary`. Strict mode reclassifies every warning as an error for
//! accumulation purposes without changing its message.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Abort on the first error-severity finding
    Failfast,
    /// Collect all findings and aggregate them at the end
    Delayed,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Failfast => write!(f, "failfast"),
            Strategy::Delayed => write!(f, "delayed"),
        }
    }
}

/// Severity of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Non-fatal, surfaced via logging on summary
    Warning,
    /// Fatal under either strategy
    Error,
}

/// Validation reporter
#[derive(Debug)]
pub struct Report {
    errors: Vec<Error>,
    warnings: Vec<Error>,
    strategy: Strategy,
    strict: bool,
}

impl Report {
    /// Create a reporter with the given strategy and strictness
    pub fn new(strategy: Strategy, strict: bool) -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            strategy,
            strict,
        }
    }

    /// Whether warnings are promoted to errors
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Record a finding
    ///
    /// In strict mode the severity is forced to error. Under the
    /// failfast strategy an error-severity finding is returned
    /// immediately instead of being accumulated, which aborts the
    /// whole validation call through `?` propagation.
    pub fn add(&mut self, finding: Error, severity: Severity) -> Result<()> {
        let severity = if self.strict {
            Severity::Error
        } else {
            severity
        };
        match severity {
            Severity::Error if self.strategy == Strategy::Failfast => Err(finding),
            Severity::Error => {
                self.errors.push(finding);
                Ok(())
            }
            Severity::Warning => {
                self.warnings.push(finding);
                Ok(())
            }
        }
    }

    /// Collected error-severity findings
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Collected warning-severity findings
    pub fn warnings(&self) -> &[Error] {
        &self.warnings
    }

    /// Log warnings and raise collected errors as one aggregated
    /// failure, enumerating every message in insertion order
    pub fn summary(self) -> Result<()> {
        for warning in &self.warnings {
            tracing::warn!("{}", warning.message());
        }
        if self.errors.is_empty() {
            return Ok(());
        }
        let messages = self
            .errors
            .iter()
            .map(|error| format!("  - {}", error.message()))
            .collect::<Vec<_>>()
            .join("\n");
        Err(Error::validation(format!("validation errors:\n{messages}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delayed_accumulates_then_aggregates() {
        let mut report = Report::new(Strategy::Delayed, false);
        report
            .add(Error::validation("\"a\" is required"), Severity::Error)
            .unwrap();
        report
            .add(Error::validation("\"b\" is required"), Severity::Error)
            .unwrap();
        let err = report.summary().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("validation errors:"));
        assert!(message.contains("  - \"a\" is required"));
        assert!(message.contains("  - \"b\" is required"));
    }

    #[test]
    fn test_failfast_returns_first_error() {
        let mut report = Report::new(Strategy::Failfast, false);
        let err = report
            .add(Error::validation("\"a\" is required"), Severity::Error)
            .unwrap_err();
        assert_eq!(err.message(), "\"a\" is required");
    }

    #[test]
    fn test_failfast_still_accumulates_warnings() {
        let mut report = Report::new(Strategy::Failfast, false);
        report
            .add(Error::validation("\"a\" is deprecated (old)"), Severity::Warning)
            .unwrap();
        assert_eq!(report.warnings().len(), 1);
        assert!(report.summary().is_ok());
    }

    #[test]
    fn test_strict_promotes_warnings() {
        let mut report = Report::new(Strategy::Delayed, true);
        report
            .add(Error::validation("\"a\" has no description"), Severity::Warning)
            .unwrap();
        assert_eq!(report.errors().len(), 1);
        assert!(report.summary().is_err());
    }

    #[test]
    fn test_strict_failfast_aborts_on_warning() {
        let mut report = Report::new(Strategy::Failfast, true);
        let err = report
            .add(Error::validation("\"a\" has no description"), Severity::Warning)
            .unwrap_err();
        assert_eq!(err.message(), "\"a\" has no description");
    }

    #[test]
    fn test_summary_with_only_warnings_is_ok() {
        let mut report = Report::new(Strategy::Delayed, false);
        report
            .add(Error::validation("\"y\" is not a valid argument"), Severity::Warning)
            .unwrap();
        assert!(report.summary().is_ok());
    }
}
