use std::fmt::{self, Write as _};
use std::time::{Duration, Instant};

use dbml_forge_core::types::{
    is_valid_identifier, Column, CustomProperties, InlineRef, PropertyValue, Reference, Schema,
    Table,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::settings::{escape, is_quoted};

/// Knobs for [`generate`]. Missing fields take their defaults when
/// deserialized, so a partial `[generate]` config section is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GenerateOptions {
    /// Emit `// Tables` and `// References` section comments.
    pub include_comments: bool,
    /// Emit a header comment with the generation time and counts.
    pub include_metadata: bool,
    /// Spaces per indentation level inside table bodies.
    pub indent_size: usize,
    /// Write custom properties back into settings lists.
    pub preserve_custom_properties: bool,
    /// Indent bodies and separate blocks with blank lines. When false the
    /// output is compact: no indentation, no blank lines.
    pub format_output: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            include_comments: false,
            include_metadata: false,
            indent_size: 2,
            preserve_custom_properties: true,
            format_output: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub text: String,
    /// False when any [`GenerateError`] was recorded.
    pub success: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub metadata: GenerateMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMetadata {
    pub tables_generated: usize,
    /// Inline `ref:` settings plus standalone `Ref` lines.
    pub references_generated: usize,
    pub lines_generated: usize,
    pub generation_time: Duration,
}

/// Things in a schema snapshot that cannot be written as notation.
#[derive(Debug)]
#[non_exhaustive]
pub enum GenerateError {
    /// A column with an empty name. The column is left out.
    EmptyColumnName { table: String },
    /// A column with an empty type. The column is left out.
    EmptyColumnType { table: String, column: String },
    /// Writing to the output buffer failed.
    Format(fmt::Error),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyColumnName { table } => {
                write!(f, "Column with an empty name in table {table}")
            }
            Self::EmptyColumnType { table, column } => {
                write!(f, "Column {table}.{column} has an empty type")
            }
            Self::Format(err) => write!(f, "Failed to write output: {err}"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Format(err) => Some(err),
            _ => None,
        }
    }
}

impl From<fmt::Error> for GenerateError {
    fn from(err: fmt::Error) -> Self {
        Self::Format(err)
    }
}

/// An inline `ref:` as declared on a column, with its owning table.
struct InlineDecl<'s> {
    table: &'s Table,
    column: &'s Column,
    inline: &'s InlineRef,
}

struct Generator<'s> {
    schema: &'s Schema,
    options: &'s GenerateOptions,
    indent: String,
    out: String,
    warnings: Vec<String>,
    errors: Vec<GenerateError>,
    tables_generated: usize,
    references_generated: usize,
}

impl<'s> Generator<'s> {
    fn new(schema: &'s Schema, options: &'s GenerateOptions) -> Self {
        let indent = if options.format_output {
            " ".repeat(options.indent_size)
        } else {
            String::new()
        };
        Self {
            schema,
            options,
            indent,
            out: String::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            tables_generated: 0,
            references_generated: 0,
        }
    }

    fn blank_line(&mut self) {
        if self.options.format_output {
            self.out.push('\n');
        }
    }

    fn write_schema(&mut self) -> Result<(), GenerateError> {
        let schema = self.schema;
        let standalone = self.standalone_references();

        if self.options.include_metadata {
            writeln!(
                self.out,
                "// Generated by dbml-forge at {}",
                chrono::Utc::now().to_rfc3339()
            )?;
            writeln!(
                self.out,
                "// {} tables, {} references",
                schema.tables.len(),
                schema.references.len()
            )?;
            self.blank_line();
        }

        if self.options.include_comments && !schema.tables.is_empty() {
            writeln!(self.out, "// Tables")?;
        }
        for (i, table) in schema.tables.iter().enumerate() {
            if i > 0 {
                self.blank_line();
            }
            self.write_table(table)?;
        }

        if !standalone.is_empty() {
            if !schema.tables.is_empty() {
                self.blank_line();
            }
            if self.options.include_comments {
                writeln!(self.out, "// References")?;
            }
            for reference in standalone {
                self.check_reference(reference);
                self.write_reference(reference)?;
            }
        }
        Ok(())
    }

    /// References not already written as an inline `ref:` setting. Each
    /// inline declaration absorbs at most one matching reference.
    fn standalone_references(&self) -> Vec<&'s Reference> {
        let schema = self.schema;
        let inline: Vec<InlineDecl<'s>> = schema
            .tables
            .iter()
            .flat_map(|table| {
                table.columns.iter().filter_map(move |column| {
                    column.inline_ref.as_ref().map(|inline| InlineDecl {
                        table,
                        column,
                        inline,
                    })
                })
            })
            .collect();
        let mut consumed = vec![false; inline.len()];

        schema
            .references
            .iter()
            .filter(|reference| {
                let hit = inline.iter().enumerate().position(|(i, decl)| {
                    !consumed[i]
                        && reference.matches_inline(
                            decl.table.schema.as_ref().map(|s| s.as_str()),
                            decl.table.name.as_str(),
                            &decl.column.name,
                            decl.inline,
                        )
                });
                match hit {
                    Some(i) => {
                        consumed[i] = true;
                        false
                    }
                    None => true,
                }
            })
            .collect()
    }

    fn check_reference(&mut self, reference: &Reference) {
        let ends = [
            (&reference.from_schema, &reference.from_table, &reference.from_column),
            (&reference.to_schema, &reference.to_table, &reference.to_column),
        ];
        for (schema, table, column) in ends {
            match self.schema.find_table(schema.as_deref(), table) {
                None => self
                    .warnings
                    .push(format!("Reference {reference} points at unknown table {table}")),
                Some(t) if t.column(column).is_none() => self.warnings.push(format!(
                    "Reference {reference} points at unknown column {table}.{column}"
                )),
                Some(_) => {}
            }
        }
    }

    fn write_table(&mut self, table: &Table) -> Result<(), GenerateError> {
        write!(self.out, "Table {}", table.qualified_name())?;
        if let Some(alias) = &table.alias {
            write!(self.out, " as {alias}")?;
        }
        if self.options.preserve_custom_properties && !table.custom_properties.is_empty() {
            let settings = custom_settings(&table.custom_properties);
            write!(self.out, " [{}]", settings.join(", "))?;
        }
        writeln!(self.out, " {{")?;

        for column in &table.columns {
            if column.name.is_empty() {
                self.errors.push(GenerateError::EmptyColumnName {
                    table: table.qualified_name(),
                });
                continue;
            }
            if column.column_type.trim().is_empty() {
                self.errors.push(GenerateError::EmptyColumnType {
                    table: table.qualified_name(),
                    column: column.name.clone(),
                });
                continue;
            }
            self.write_column(column)?;
        }

        if let Some(note) = &table.note {
            writeln!(self.out, "{}Note: '{}'", self.indent, escape(note, '\''))?;
        }
        writeln!(self.out, "}}")?;
        self.tables_generated += 1;
        Ok(())
    }

    fn write_column(&mut self, column: &Column) -> Result<(), GenerateError> {
        self.out.push_str(&self.indent);
        if column.needs_quoted_name() {
            write!(self.out, "\"{}\"", escape(&column.name, '"'))?;
        } else {
            self.out.push_str(&column.name);
        }
        write!(self.out, " {}", format_type(&column.column_type))?;

        let settings = self.column_settings(column);
        if !settings.is_empty() {
            write!(self.out, " [{}]", settings.join(", "))?;
        }
        self.out.push('\n');
        Ok(())
    }

    fn column_settings(&mut self, column: &Column) -> Vec<String> {
        let mut settings = Vec::new();
        if column.primary_key {
            settings.push("pk".to_string());
        }
        if column.not_null {
            settings.push("not null".to_string());
        }
        if column.unique {
            settings.push("unique".to_string());
        }
        if let Some(default) = &column.default {
            settings.push(format!("default: {}", format_default(default)));
        }
        if let Some(note) = &column.note {
            settings.push(format!("note: '{}'", escape(note, '\'')));
        }
        if let Some(inline) = &column.inline_ref {
            settings.push(format!(
                "ref: {} {}",
                inline.kind.symbol(),
                endpoint(inline.to_schema.as_deref(), &inline.to_table, &inline.to_column)
            ));
            self.references_generated += 1;
        }
        if self.options.preserve_custom_properties {
            settings.extend(custom_settings(&column.custom_properties));
        }
        settings
    }

    fn write_reference(&mut self, reference: &Reference) -> Result<(), GenerateError> {
        match &reference.name {
            Some(name) => write!(self.out, "Ref {name}: ")?,
            None => write!(self.out, "Ref: ")?,
        }
        write!(
            self.out,
            "{} {} {}",
            endpoint(
                reference.from_schema.as_deref(),
                &reference.from_table,
                &reference.from_column
            ),
            reference.kind.symbol(),
            endpoint(
                reference.to_schema.as_deref(),
                &reference.to_table,
                &reference.to_column
            ),
        )?;

        let mut settings = Vec::new();
        if let Some(action) = reference.on_delete {
            settings.push(format!("delete: {action}"));
        }
        if let Some(action) = reference.on_update {
            settings.push(format!("update: {action}"));
        }
        if !settings.is_empty() {
            write!(self.out, " [{}]", settings.join(", "))?;
        }
        self.out.push('\n');
        self.references_generated += 1;
        Ok(())
    }

    fn finish(self, started: Instant) -> GenerateResult {
        let lines_generated = self.out.lines().count();
        GenerateResult {
            success: self.errors.is_empty(),
            text: self.out,
            warnings: self.warnings,
            errors: self.errors.iter().map(ToString::to_string).collect(),
            metadata: GenerateMetadata {
                tables_generated: self.tables_generated,
                references_generated: self.references_generated,
                lines_generated,
                generation_time: started.elapsed(),
            },
        }
    }
}

/// Quotes the type when it holds whitespace outside parentheses, so that
/// `"timestamp with time zone"` survives but `decimal(10, 2)` stays bare.
fn format_type(column_type: &str) -> String {
    let mut depth = 0usize;
    let needs_quotes = column_type.chars().any(|c| {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        depth == 0 && c.is_whitespace()
    });
    if needs_quotes {
        format!("\"{}\"", escape(column_type, '"'))
    } else {
        column_type.to_string()
    }
}

/// Numeric literals and already-quoted values pass through; anything else
/// is single-quoted.
fn format_default(value: &str) -> String {
    if is_numeric_literal(value) || is_quoted(value) {
        value.to_string()
    } else {
        format!("'{}'", escape(value, '\''))
    }
}

fn is_numeric_literal(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(int) && frac.map_or(true, all_digits)
}

fn custom_settings(properties: &CustomProperties) -> Vec<String> {
    properties
        .iter()
        .map(|(key, value)| match value {
            PropertyValue::Flag(true) => key.clone(),
            PropertyValue::Flag(false) => format!("{key}: false"),
            PropertyValue::Text(text) if needs_value_quotes(text) => {
                format!("{key}: '{}'", escape(text, '\''))
            }
            PropertyValue::Text(text) => format!("{key}: {text}"),
        })
        .collect()
}

fn needs_value_quotes(text: &str) -> bool {
    text.is_empty()
        || text
            .chars()
            .any(|c| {
                c.is_whitespace()
                    || matches!(c, ',' | ':' | '[' | ']' | '(' | ')' | '\'' | '"' | '`' | '\\')
            })
}

/// `table[.schema].column`, quoting parts that are not bare identifiers.
fn endpoint(schema: Option<&str>, table: &str, column: &str) -> String {
    let part = |s: &str| {
        if is_valid_identifier(s) {
            s.to_string()
        } else {
            format!("\"{}\"", escape(s, '"'))
        }
    };
    match schema {
        Some(schema) => format!("{}.{}.{}", part(table), part(schema), part(column)),
        None => format!("{}.{}", part(table), part(column)),
    }
}

/// Serializes a schema snapshot into notation text.
///
/// Output order follows the schema's table, column and reference order.
/// Never fails outright: unwritable columns are skipped and reported in
/// `errors`, which also clears `success`.
pub fn generate(schema: &Schema, options: &GenerateOptions) -> GenerateResult {
    let started = Instant::now();
    let mut generator = Generator::new(schema, options);
    if let Err(err) = generator.write_schema() {
        generator.errors.push(err);
    }
    let result = generator.finish(started);
    debug!(
        tables = result.metadata.tables_generated,
        references = result.metadata.references_generated,
        lines = result.metadata.lines_generated,
        success = result.success,
        "generate finished"
    );
    result
}
