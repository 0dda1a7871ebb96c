//! Diagnostic severities for script annotations
//!
//! Anomalies inside a diff run never abort it; they degrade to `--` comment
//! lines in the generated script. The severity decides the comment prefix
//! and how the CLI counts the line in its summary.

use serde::{Deserialize, Serialize};

/// Severity of an advisory comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Context for the operator; no action implied
    Notice,

    /// The following statement carries risk (data loss, unverified coercion)
    Warning,

    /// An unexpected situation; the affected action was skipped
    Error,
}

impl Severity {
    /// Comment prefix used when rendering into a script
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Notice => "Notice",
            Self::Warning => "WARNING",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notice => write!(f, "notice"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Notice < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
}
