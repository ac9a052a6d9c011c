use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a diagnostic blocks a clean parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// What class of problem a diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DiagnosticKind {
    /// A line does not fit the grammar of its construct.
    Structural,
    /// Duplicate names, invalid identifiers, unresolved references.
    Semantic,
    /// A recognized keyword whose content is not modeled.
    UnsupportedConstruct,
    /// A setting key outside the fixed vocabulary.
    UnknownSetting,
    /// A line that matched no construct at all.
    UnrecognizedSyntax,
    /// Unexpected internal failure; parsing stopped here.
    Internal,
}

/// A line-scoped parse error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line in the original text.
    pub line: usize,
    /// 1-based column in the original line.
    pub column: usize,
    pub message: String,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(
        line: usize,
        column: usize,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            severity: Severity::Error,
            kind,
            suggestion: None,
        }
    }

    pub fn warning(
        line: usize,
        column: usize,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            severity: Severity::Warning,
            kind,
            suggestion: None,
        }
    }

    /// Attaches a human-readable fix suggestion.
    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}:{}: {}: {}",
            self.line, self.column, self.severity, self.message
        )
    }
}
