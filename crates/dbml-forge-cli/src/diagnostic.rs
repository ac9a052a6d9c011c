use dbml_forge_core::types::{Diagnostic as ParseDiagnostic, Severity};
use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};

/// A parse diagnostic prepared for miette rendering.
///
/// `Diagnostic` is implemented by hand because severity comes from the
/// parse diagnostic at runtime.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct NotationDiagnostic {
    src: NamedSource<String>,
    span: SourceSpan,
    message: String,
    label: String,
    suggestion: Option<String>,
    severity: miette::Severity,
}

impl Diagnostic for NotationDiagnostic {
    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.suggestion
            .as_ref()
            .map(|s| Box::new(s) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label.clone()),
            self.span,
        ))))
    }
}

/// Convert a line-scoped parse diagnostic into a `NotationDiagnostic`.
///
/// The span covers the rest of the reported line, starting at the
/// reported column.
pub fn to_notation_diagnostic(
    diagnostic: &ParseDiagnostic,
    source: &str,
    filename: &str,
) -> NotationDiagnostic {
    let (offset, len) = line_span(source, diagnostic.line, diagnostic.column);
    NotationDiagnostic {
        src: NamedSource::new(filename, source.to_string()),
        span: (offset, len).into(),
        message: diagnostic.message.clone(),
        label: kind_label(diagnostic).to_string(),
        suggestion: diagnostic.suggestion.clone(),
        severity: match diagnostic.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        },
    }
}

/// Render parse diagnostics for a file using miette.
pub fn render_diagnostics<'a>(
    diagnostics: impl IntoIterator<Item = &'a ParseDiagnostic>,
    source: &str,
    filename: &str,
) -> Vec<miette::Report> {
    diagnostics
        .into_iter()
        .map(|d| miette::Report::new(to_notation_diagnostic(d, source, filename)))
        .collect()
}

fn kind_label(diagnostic: &ParseDiagnostic) -> &'static str {
    use dbml_forge_core::types::DiagnosticKind;
    match diagnostic.kind {
        DiagnosticKind::Structural => "malformed here",
        DiagnosticKind::Semantic => "invalid here",
        DiagnosticKind::UnsupportedConstruct => "not modeled",
        DiagnosticKind::UnknownSetting => "unknown setting",
        DiagnosticKind::UnrecognizedSyntax => "unrecognized",
        DiagnosticKind::Internal => "parsing stopped here",
        _ => "here",
    }
}

/// Byte offset and length for a 1-based line/column pair. Out-of-range
/// positions clamp to the end of the source.
fn line_span(source: &str, line: usize, column: usize) -> (usize, usize) {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let content = text.trim_end_matches(['\n', '\r']);
            let start = content
                .char_indices()
                .nth(column.saturating_sub(1))
                .map_or(content.len(), |(i, _)| i);
            let end = content.trim_end().len().max(start);
            return (offset + start, end - start);
        }
        offset += text.len();
    }
    (source.len(), 0)
}
