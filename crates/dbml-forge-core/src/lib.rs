//! # dbml-forge-core
//!
//! The in-memory schema model shared by the notation parser, the generator,
//! and any host application (tables, typed columns, references, diagnostics).

pub mod error;
pub mod types;

pub use error::SchemaError;
