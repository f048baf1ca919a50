//! Severity Ladder
//!
//! A totally ordered severity scale plus two sentinels that widen the lattice:
//! `Allow` (nothing exceeds it) and `Block` (every real severity exceeds it).
//! Operators use the sentinels to express "never deny on this axis" or
//! "deny on any finding" without a separate on/off flag.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A severity level, with `Allow`/`Block` sentinels widening the real scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Sentinel: ranks below every real severity. A threshold of `Allow`
    /// never triggers `exceeds`.
    Allow,
    Low,
    Medium,
    High,
    Critical,
    /// Sentinel: ranks above every real severity. A threshold of `Block`
    /// is exceeded by any real severity.
    Block,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized severity {0:?}")]
pub struct ParseSeverityError(pub String);

impl Severity {
    /// Parse a severity string. Empty string is rejected here: callers that
    /// treat empty as "use the component default" must handle that before
    /// calling `parse`, since the ladder has no opinion on defaults.
    pub fn parse(s: &str) -> Result<Self, ParseSeverityError> {
        match s {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            "ALLOW_ALL" => Ok(Severity::Allow),
            "BLOCK_ALL" => Ok(Severity::Block),
            other => Err(ParseSeverityError(other.to_string())),
        }
    }

    /// True iff `self` ranks strictly above `threshold`.
    pub fn exceeds(&self, threshold: Severity) -> bool {
        *self > threshold
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Allow => "ALLOW_ALL",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
            Severity::Block => "BLOCK_ALL",
        };
        f.write_str(s)
    }
}
