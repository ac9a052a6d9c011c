use dbml_forge_core::types::{Diagnostic, Severity};

use crate::error::DslError;
use crate::preprocess::SourceLine;

/// Accumulates line-scoped errors and warnings during one parse.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `err` against `line`, pointing the column at the error's
    /// subject text when it appears on the line.
    pub fn report(&mut self, line: &SourceLine, err: &DslError) {
        let column = err
            .subject()
            .map_or_else(|| line.column(), |subject| line.column_of(subject));
        let diagnostic = match err.severity() {
            Severity::Error => Diagnostic::error(line.number, column, err.kind(), err.to_string()),
            Severity::Warning => {
                Diagnostic::warning(line.number, column, err.kind(), err.to_string())
            }
        }
        .with_suggestion(err.suggestion());

        if diagnostic.is_error() {
            self.errors.push(diagnostic);
        } else {
            self.warnings.push(diagnostic);
        }
    }

    /// Consumes the collector, returning (errors, warnings) ordered by
    /// position. Diagnostics on the same line keep their report order.
    pub fn into_sorted(mut self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        self.errors.sort_by_key(|d| d.line);
        self.warnings.sort_by_key(|d| d.line);
        (self.errors, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use dbml_forge_core::types::DiagnosticKind;

    use super::*;
    use crate::error::NameRole;

    fn line(number: usize, indent: usize, text: &str) -> SourceLine {
        SourceLine {
            number,
            indent,
            text: text.to_string(),
        }
    }

    #[test]
    fn errors_and_warnings_are_separated() {
        let mut diags = Diagnostics::new();
        diags.report(&line(1, 0, "Enum x {"), &DslError::UnsupportedConstruct {
            keyword: "Enum".into(),
        });
        diags.report(&line(2, 0, "Table 1bad {"), &DslError::InvalidIdentifier {
            role: NameRole::Table,
            name: "1bad".into(),
        });
        let (errors, warnings) = diags.into_sorted();
        assert_eq!(errors.len(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn column_points_at_subject() {
        let mut diags = Diagnostics::new();
        diags.report(&line(4, 2, "Table 1bad {"), &DslError::InvalidIdentifier {
            role: NameRole::Table,
            name: "1bad".into(),
        });
        let (errors, _) = diags.into_sorted();
        assert_eq!(errors[0].line, 4);
        assert_eq!(errors[0].column, 9);
        assert_eq!(errors[0].kind, DiagnosticKind::Semantic);
        assert_eq!(errors[0].suggestion.as_deref(), Some("Rename to '_1bad'."));
    }

    #[test]
    fn sorted_by_line() {
        let mut diags = Diagnostics::new();
        diags.report(&line(9, 0, "x"), &DslError::UnterminatedSettings);
        diags.report(&line(3, 0, "y"), &DslError::UnterminatedSettings);
        let (errors, _) = diags.into_sorted();
        assert_eq!(errors.iter().map(|d| d.line).collect::<Vec<_>>(), vec![3, 9]);
    }
}
