use std::fmt;

use dbml_forge_core::types::{sanitize_identifier, DiagnosticKind, Severity};

/// Which kind of name an identifier check was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRole {
    Table,
    Schema,
    Column,
    Alias,
}

impl fmt::Display for NameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Schema => write!(f, "schema"),
            Self::Column => write!(f, "column"),
            Self::Alias => write!(f, "alias"),
        }
    }
}

/// Problems the parser can detect on a single line.
///
/// Every variant except [`DslError::Internal`] is line-scoped: the parser
/// records it as a diagnostic, drops the offending construct and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DslError {
    /// A `Table` line that does not fit `Table name[.schema] [as alias] [settings] {`.
    MalformedTableHeader { reason: String },

    /// A table body line that does not fit `name type [settings]`.
    MalformedColumn { reason: String },

    /// A `Ref` line or `ref:` setting that does not fit `a.col <symbol> b.col`.
    MalformedReference { reason: String },

    /// A `[` that opens a settings list with no matching `]`.
    UnterminatedSettings,

    /// A `{` block that reaches end of input without its closing `}`.
    UnterminatedBlock { construct: String },

    /// A name failed `[a-zA-Z_][a-zA-Z0-9_]*` validation.
    InvalidIdentifier { role: NameRole, name: String },

    /// A second table with the same (schema, name) pair.
    DuplicateTable { name: String },

    /// A second column with the same name inside one table.
    DuplicateColumn { table: String, name: String },

    /// A standalone reference names a table not declared above it.
    TableNotFound { name: String },

    /// A standalone reference names a column its table does not have.
    ColumnNotFound { table: String, column: String },

    /// An inline `ref:` target that never got declared anywhere in the text.
    UnresolvedInlineReference { target: String },

    /// A setting key outside the fixed vocabulary.
    UnknownSetting { key: String },

    /// A `delete:`/`update:` value that is not a referential action.
    UnknownReferentialAction { value: String },

    /// A recognized keyword whose content is not modeled.
    UnsupportedConstruct { keyword: String },

    /// A line that matched no construct.
    UnrecognizedSyntax { text: String },

    /// Unexpected internal failure. The only error that stops a parse.
    Internal { message: String },
}

impl DslError {
    /// The diagnostic class this error is reported under.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::MalformedTableHeader { .. }
            | Self::MalformedColumn { .. }
            | Self::MalformedReference { .. }
            | Self::UnterminatedSettings
            | Self::UnterminatedBlock { .. } => DiagnosticKind::Structural,
            Self::InvalidIdentifier { .. }
            | Self::DuplicateTable { .. }
            | Self::DuplicateColumn { .. }
            | Self::TableNotFound { .. }
            | Self::ColumnNotFound { .. }
            | Self::UnresolvedInlineReference { .. } => DiagnosticKind::Semantic,
            Self::UnknownSetting { .. } | Self::UnknownReferentialAction { .. } => {
                DiagnosticKind::UnknownSetting
            }
            Self::UnsupportedConstruct { .. } => DiagnosticKind::UnsupportedConstruct,
            Self::UnrecognizedSyntax { .. } => DiagnosticKind::UnrecognizedSyntax,
            Self::Internal { .. } => DiagnosticKind::Internal,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnresolvedInlineReference { .. }
            | Self::UnknownSetting { .. }
            | Self::UnknownReferentialAction { .. }
            | Self::UnsupportedConstruct { .. }
            | Self::UnrecognizedSyntax { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// True only for the error that aborts the whole parse.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Source text the diagnostic column should point at, when there is one.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::InvalidIdentifier { name, .. }
            | Self::DuplicateTable { name }
            | Self::DuplicateColumn { name, .. }
            | Self::TableNotFound { name } => Some(name),
            Self::ColumnNotFound { column, .. } => Some(column),
            Self::UnknownSetting { key } => Some(key),
            Self::UnknownReferentialAction { value } => Some(value),
            Self::UnresolvedInlineReference { target } => Some(target),
            _ => None,
        }
    }

    /// An actionable fix, when one can be derived from the error alone.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidIdentifier { role, name } => {
                let fixed = sanitize_identifier(name);
                if *role == NameRole::Column {
                    Some(format!("Rename to '{fixed}' or quote the name: \"{name}\""))
                } else {
                    Some(format!("Rename to '{fixed}'."))
                }
            }
            Self::DuplicateTable { .. } => {
                Some("Remove the duplicate or rename one of the tables.".to_string())
            }
            Self::DuplicateColumn { .. } => {
                Some("Remove the duplicate or rename one of the columns.".to_string())
            }
            Self::TableNotFound { name } => Some(format!(
                "Declare table '{name}' before this reference, or fix the table name."
            )),
            Self::ColumnNotFound { table, column } => {
                Some(format!("Add column '{column}' to table '{table}', or fix the column name."))
            }
            Self::UnresolvedInlineReference { target } => {
                Some(format!("Declare '{target}' somewhere in the file."))
            }
            Self::UnknownSetting { .. } => Some(
                "Known settings: pk, primary key, not null, null, unique, default, note, ref."
                    .to_string(),
            ),
            Self::UnknownReferentialAction { .. } => Some(
                "Use one of: cascade, restrict, set null, set default, no action.".to_string(),
            ),
            Self::UnterminatedSettings => Some("Close the settings list with ']'.".to_string()),
            Self::UnterminatedBlock { .. } => Some("Add the missing '}'.".to_string()),
            Self::MalformedColumn { .. } => Some(
                "Columns are written as: name type [settings], e.g. id integer [pk]".to_string(),
            ),
            Self::MalformedReference { .. } => Some(
                "References are written as: Ref: table.column > other.column".to_string(),
            ),
            Self::MalformedTableHeader { .. } => {
                Some("Tables are written as: Table name {".to_string())
            }
            _ => None,
        }
    }
}

impl fmt::Display for DslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTableHeader { reason } => {
                write!(f, "Malformed table declaration: {reason}")
            }
            Self::MalformedColumn { reason } => write!(f, "Malformed column definition: {reason}"),
            Self::MalformedReference { reason } => write!(f, "Malformed reference: {reason}"),
            Self::UnterminatedSettings => write!(f, "Unterminated settings list: missing ']'"),
            Self::UnterminatedBlock { construct } => {
                write!(f, "Unterminated {construct} block: missing '}}'")
            }
            Self::InvalidIdentifier { role, name } => write!(f, "Invalid {role} name: {name}"),
            Self::DuplicateTable { name } => write!(f, "Duplicate table name: {name}"),
            Self::DuplicateColumn { table, name } => {
                write!(f, "Duplicate column name: {name} in table {table}")
            }
            Self::TableNotFound { name } => write!(f, "Referenced table not found: {name}"),
            Self::ColumnNotFound { table, column } => {
                write!(f, "Referenced column not found: {table}.{column}")
            }
            Self::UnresolvedInlineReference { target } => {
                write!(f, "Inline reference target not found: {target}")
            }
            Self::UnknownSetting { key } => write!(f, "Unknown setting: {key}"),
            Self::UnknownReferentialAction { value } => {
                write!(f, "Unknown referential action: {value}")
            }
            Self::UnsupportedConstruct { keyword } => {
                write!(f, "{keyword} is recognized but not modeled; its content is ignored")
            }
            Self::UnrecognizedSyntax { text } => write!(f, "Unrecognized syntax: {text}"),
            Self::Internal { message } => write!(f, "Internal parser error: {message}"),
        }
    }
}

impl std::error::Error for DslError {}
