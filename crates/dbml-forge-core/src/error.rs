use std::fmt;

/// Errors that occur when constructing or validating schema types.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// Identifier failed `[a-zA-Z_][a-zA-Z0-9_]*` validation.
    InvalidIdentifier(String),
    /// A name was empty where one is required.
    EmptyName,
    /// Referential action keyword was not recognized.
    UnknownReferentialAction(String),
    /// Relationship symbol was not one of `-`, `>`, `<`, `<>`.
    UnknownRelationSymbol(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier(s) => {
                write!(
                    f,
                    "invalid identifier '{s}': must match [a-zA-Z_][a-zA-Z0-9_]*"
                )
            }
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::UnknownReferentialAction(s) => write!(
                f,
                "unknown referential action '{s}': expected cascade, restrict, set null, set default, or no action"
            ),
            Self::UnknownRelationSymbol(s) => {
                write!(f, "unknown relationship symbol '{s}': expected -, >, < or <>")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
