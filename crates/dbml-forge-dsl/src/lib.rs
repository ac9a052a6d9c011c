//! # dbml-forge-dsl
//!
//! Parser and generator for the line-and-brace table notation.
//!
//! This crate provides:
//! - A preprocessor and line classifier built on a `logos` token set
//! - A forgiving structural parser that reports line-scoped diagnostics
//!   instead of failing, and never keeps state between calls
//! - A generator that turns a `Schema` back into notation text
//! - A round-trip validator: `parse(generate(schema).text)` keeps the same
//!   tables and references
//!
//! # Example
//!
//! ```
//! use dbml_forge_dsl::{generate, parse, GenerateOptions};
//!
//! let source = r#"
//! Table users {
//!   id integer [pk]
//!   email varchar(255) [unique, not null]
//! }
//!
//! Table posts {
//!   id integer [pk]
//!   user_id integer [ref: > users.id]
//! }
//! "#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert_eq!(result.schema.tables.len(), 2);
//! assert_eq!(result.schema.references.len(), 1);
//!
//! let output = generate(&result.schema, &GenerateOptions::default());
//! assert!(output.text.contains("Table posts {"));
//! ```

mod classify;
mod diagnostics;
pub mod error;
pub mod generator;
pub mod parser;
mod preprocess;
pub mod round_trip;
pub mod settings;
pub mod token;

pub use error::{DslError, NameRole};
pub use generator::{generate, GenerateError, GenerateMetadata, GenerateOptions, GenerateResult};
pub use parser::{parse, ParseMetadata, ParseResult};
pub use round_trip::{validate_round_trip, RoundTripMismatch, RoundTripReport};
