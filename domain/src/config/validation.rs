//! Structured configuration issues.
//!
//! Loaders report every problem they find as a [`ConfigIssue`] instead of
//! failing on the first one, so the CLI can print warnings and stop only on
//! [`Severity::Error`].

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A model field contains an empty string.
    EmptyModelName { field: String },
    /// The same model appears twice in the council.
    DuplicateCouncilMember { model: String },
    /// No council members are configured.
    EmptyCouncil,
    /// A numeric setting is out of its valid range.
    InvalidValue { field: String, value: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let err = ConfigIssue::error(ConfigIssueCode::EmptyCouncil, "no members");
        assert!(err.is_error());

        let warn = ConfigIssue::warning(
            ConfigIssueCode::InvalidValue {
                field: "execution.model_timeout_secs".to_string(),
                value: "0".to_string(),
            },
            "timeout of 0 disables every call",
        );
        assert!(!warn.is_error());
        assert_eq!(warn.severity, Severity::Warning);
    }
}
