//! Tradeline validation and confidence scoring.

pub mod dates;
pub mod fields;
mod pipeline;
pub mod scorer;

pub use pipeline::ValidationPipeline;
pub use scorer::{ConfidenceScorer, ScoreBreakdown};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single field validator.
///
/// A passing check may still carry a warning message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCheck {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldCheck {
    pub fn pass() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }

    /// Passing check with a warning attached.
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
        }
    }
}

/// Validation verdict for one tradeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// No errors and confidence at or above the configured minimum.
    pub valid: bool,
    pub severity: Severity,
    /// Confidence in `[0, 100]`.
    pub confidence: f64,
    /// Weighted points per scoring component.
    pub contributions: BTreeMap<String, f64>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
    pub field_results: BTreeMap<String, FieldCheck>,
    /// Shares an account number with an earlier record of the same batch.
    #[serde(default)]
    pub duplicate_in_batch: bool,
}

impl ValidationResult {
    /// Severity implied by the collected messages.
    pub fn overall_severity(&self) -> Severity {
        if !self.errors.is_empty() {
            Severity::Critical
        } else if !self.warnings.is_empty() {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_and_serde() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"WARNING\"");
    }
}
