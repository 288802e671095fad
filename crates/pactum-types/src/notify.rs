//! Participant-facing notification types
//!
//! Transitions emit short human-readable notices. Delivery is fire-and-forget
//! and a notice is never a precondition for a state change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a notice should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Routine lifecycle progress
    Info,
    /// A step completed in the acting party's favor
    Success,
    /// Something needs attention (dispute opened, deadline fired)
    Warning,
    /// An action was attempted and failed
    Error,
}

impl Severity {
    /// Lowercase label for log fields
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One participant-facing notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Presentation severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
}

impl Notice {
    /// Create an info notice
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Create a success notice
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    /// Create a warning notice
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Create an error notice
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_constructors() {
        assert_eq!(Notice::info("created").severity, Severity::Info);
        assert_eq!(Notice::success("funded").severity, Severity::Success);
        assert_eq!(Notice::warning("dispute opened").severity, Severity::Warning);
        assert_eq!(Notice::error("broadcast failed").severity, Severity::Error);
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
