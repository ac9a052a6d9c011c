//! Generate-then-reparse regression check.
//!
//! Compares table count, table-name set and reference count, and requires
//! zero hard errors on reparse. Columns and settings are not compared.

use std::collections::BTreeSet;
use std::fmt;

use dbml_forge_core::types::{Diagnostic, Schema};
use serde::Serialize;
use tracing::debug;

use crate::generator::{generate, GenerateOptions};
use crate::parser::parse;

/// One way the reparsed schema differs from the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundTripMismatch {
    /// Generation itself reported errors.
    GenerationFailed { errors: Vec<String> },
    /// The generated text did not reparse cleanly.
    ReparseErrors { count: usize },
    TableCount { expected: usize, actual: usize },
    /// Qualified names present on only one side.
    TableNames {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    ReferenceCount { expected: usize, actual: usize },
}

impl fmt::Display for RoundTripMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenerationFailed { errors } => {
                write!(f, "generation failed: {}", errors.join("; "))
            }
            Self::ReparseErrors { count } => {
                write!(f, "generated text reparsed with {count} error(s)")
            }
            Self::TableCount { expected, actual } => {
                write!(f, "table count changed: expected {expected}, got {actual}")
            }
            Self::TableNames {
                missing,
                unexpected,
            } => {
                write!(f, "table names changed")?;
                if !missing.is_empty() {
                    write!(f, "; missing: {}", missing.join(", "))?;
                }
                if !unexpected.is_empty() {
                    write!(f, "; unexpected: {}", unexpected.join(", "))?;
                }
                Ok(())
            }
            Self::ReferenceCount { expected, actual } => {
                write!(f, "reference count changed: expected {expected}, got {actual}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTripReport {
    /// The generated notation that was reparsed.
    pub generated: String,
    pub reparse_errors: Vec<Diagnostic>,
    pub mismatches: Vec<RoundTripMismatch>,
}

impl RoundTripReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Generates text from `schema`, reparses it and compares the two schemas.
pub fn validate_round_trip(schema: &Schema, options: &GenerateOptions) -> RoundTripReport {
    let generated = generate(schema, options);
    let reparsed = parse(&generated.text);
    let mut mismatches = Vec::new();

    if !generated.success {
        mismatches.push(RoundTripMismatch::GenerationFailed {
            errors: generated.errors.clone(),
        });
    }
    if !reparsed.errors.is_empty() {
        mismatches.push(RoundTripMismatch::ReparseErrors {
            count: reparsed.errors.len(),
        });
    }

    let expected = schema.tables.len();
    let actual = reparsed.schema.tables.len();
    if expected != actual {
        mismatches.push(RoundTripMismatch::TableCount { expected, actual });
    }

    let before: BTreeSet<String> = schema.table_names().into_iter().collect();
    let after: BTreeSet<String> = reparsed.schema.table_names().into_iter().collect();
    if before != after {
        mismatches.push(RoundTripMismatch::TableNames {
            missing: before.difference(&after).cloned().collect(),
            unexpected: after.difference(&before).cloned().collect(),
        });
    }

    let expected = schema.references.len();
    let actual = reparsed.schema.references.len();
    if expected != actual {
        mismatches.push(RoundTripMismatch::ReferenceCount { expected, actual });
    }

    debug!(passed = mismatches.is_empty(), mismatches = mismatches.len(), "round trip checked");
    RoundTripReport {
        generated: generated.text,
        reparse_errors: reparsed.errors,
        mismatches,
    }
}
