use std::time::{Duration, Instant};

use dbml_forge_core::types::{
    find_table_in, is_valid_identifier, Column, Diagnostic, EntityKind, IdCounters, Identifier,
    InlineRef, PropertyValue, Reference, ReferentialAction, RelationKind, Schema, SchemaMetadata,
    Table,
};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::classify::{classify, LineKind};
use crate::diagnostics::Diagnostics;
use crate::error::{DslError, NameRole};
use crate::preprocess::{count_comment_lines, preprocess, SourceLine};
use crate::settings::{parse_settings, split_settings_list, unescape, unquote, SettingKey};
use crate::token::{lex_prefix, Keyword, SpannedToken, Token};

/// Everything one call to [`parse`] produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub schema: Schema,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub metadata: ParseMetadata,
}

impl ParseResult {
    /// True if no hard errors were reported. Warnings do not count.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors and warnings together, ordered by line.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        let mut all: Vec<&Diagnostic> = self.errors.iter().chain(&self.warnings).collect();
        all.sort_by_key(|d| (d.line, d.column));
        all
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMetadata {
    pub parse_time: Duration,
    /// Preprocessed (non-blank, non-comment) lines consumed.
    pub lines_processed: usize,
    /// Line-initial `//` comments skipped. Generated text does not carry them.
    pub comment_lines: usize,
    /// Feature tags in first-seen order, e.g. `tables`, `inline_references`.
    pub features_used: Vec<String>,
}

/// A `table[.schema].column` reference endpoint as written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    schema: Option<String>,
    table: String,
    column: String,
}

impl Endpoint {
    fn table_display(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{schema}", self.table),
            None => self.table.clone(),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table_display(), self.column)
    }
}

/// `from <symbol> to`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relation {
    from: Endpoint,
    kind: RelationKind,
    to: Endpoint,
}

/// An inline `ref:` whose target is checked once the whole text is read.
#[derive(Debug)]
struct PendingInline<'a> {
    line: &'a SourceLine,
    target: Endpoint,
}

/// Parsed pieces of a `Table` header line.
#[derive(Debug, PartialEq, Eq)]
struct TableHeader<'t> {
    schema: Option<&'t str>,
    name: &'t str,
    alias: Option<&'t str>,
    settings: Option<&'t str>,
    opens_body: bool,
}

/// State for a single parse. Built fresh by [`parse`] and dropped when it
/// returns, so nothing carries over between calls.
struct ParseContext<'a> {
    lines: &'a [SourceLine],
    cursor: usize,
    tables: Vec<Table>,
    references: Vec<Reference>,
    ids: IdCounters,
    diagnostics: Diagnostics,
    features: Vec<&'static str>,
    pending_inline: Vec<PendingInline<'a>>,
}

impl<'a> ParseContext<'a> {
    fn new(lines: &'a [SourceLine]) -> Self {
        Self {
            lines,
            cursor: 0,
            tables: Vec::new(),
            references: Vec::new(),
            ids: IdCounters::new(),
            diagnostics: Diagnostics::new(),
            features: Vec::new(),
            pending_inline: Vec::new(),
        }
    }

    // -- Cursor helpers --

    fn peek(&self) -> Option<&'a SourceLine> {
        let lines = self.lines;
        lines.get(self.cursor)
    }

    /// Consumes the next line if it is a lone `{` (brace on its own line).
    fn consume_lone_open_brace(&mut self) -> bool {
        match self.peek() {
            Some(line) if line.text == "{" => {
                self.cursor += 1;
                true
            }
            _ => false,
        }
    }

    fn use_feature(&mut self, tag: &'static str) {
        if !self.features.contains(&tag) {
            self.features.push(tag);
        }
    }

    fn report(&mut self, line: &SourceLine, err: DslError) {
        self.diagnostics.report(line, &err);
    }

    /// Records a line-scoped error, passing the fatal one through.
    fn settle(&mut self, line: &SourceLine, result: Result<(), DslError>) -> Result<(), DslError> {
        match result {
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.report(line, err);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    // -- Top level --

    fn run(&mut self) {
        while let Some(line) = self.peek() {
            let before = self.cursor;
            let outcome = self.dispatch(line).and_then(|()| {
                if self.cursor > before {
                    Ok(())
                } else {
                    Err(DslError::Internal {
                        message: format!("no progress at line {}", line.number),
                    })
                }
            });
            if let Err(err) = outcome {
                warn!(line = line.number, error = %err, "parse aborted");
                self.report(line, err);
                break;
            }
        }
        self.resolve_inline_references();
    }

    fn dispatch(&mut self, line: &'a SourceLine) -> Result<(), DslError> {
        let kind = classify(&line.text);
        trace!(line = line.number, ?kind, "dispatch");
        let result = match kind {
            LineKind::Table => self.parse_table(line),
            LineKind::Ref => self.parse_standalone_ref(line),
            LineKind::Enum | LineKind::Project | LineKind::TableGroup | LineKind::Indexes => {
                self.skip_unmodeled(line, kind)
            }
            LineKind::Brace | LineKind::NoteLine | LineKind::ColumnLike | LineKind::Unknown => {
                self.cursor += 1;
                Err(DslError::UnrecognizedSyntax {
                    text: line.text.clone(),
                })
            }
        };
        self.settle(line, result)
    }

    // -- Blocks the model does not represent --

    fn skip_unmodeled(&mut self, line: &'a SourceLine, kind: LineKind) -> Result<(), DslError> {
        self.cursor += 1;
        let keyword = kind.unmodeled_keyword().ok_or_else(|| DslError::Internal {
            message: format!("{kind:?} is not an unmodeled construct"),
        })?;
        self.use_feature(match keyword {
            Keyword::Enum => "enums",
            Keyword::Project => "projects",
            Keyword::TableGroup => "table_groups",
            _ => "indexes",
        });

        let (opens, closes) = brace_balance(&line.text);
        if opens > closes {
            self.skip_block_body(line, keyword.as_str(), opens - closes);
        } else if opens == 0 && self.consume_lone_open_brace() {
            self.skip_block_body(line, keyword.as_str(), 1);
        }

        Err(DslError::UnsupportedConstruct {
            keyword: keyword.as_str().to_string(),
        })
    }

    /// Skips lines until `depth` open braces are closed. The cursor must be
    /// on the first line after the opening brace. Stops without consuming a
    /// line that starts the next top-level block.
    fn skip_block_body(&mut self, header: &SourceLine, construct: &str, mut depth: usize) {
        while let Some(line) = self.peek() {
            if starts_top_level_block(classify(&line.text), &line.text) {
                break;
            }
            self.cursor += 1;
            let (opens, closes) = brace_balance(&line.text);
            depth += opens;
            if closes >= depth {
                return;
            }
            depth -= closes;
        }
        self.report(
            header,
            DslError::UnterminatedBlock {
                construct: construct.to_string(),
            },
        );
    }

    // -- Tables --

    fn parse_table(&mut self, line: &'a SourceLine) -> Result<(), DslError> {
        self.cursor += 1;
        self.use_feature("tables");

        let header = match parse_table_header(&line.text) {
            Ok(header) => header,
            Err(err) => {
                if line.text.ends_with('{') || self.consume_lone_open_brace() {
                    self.skip_block_body(line, "Table", 1);
                }
                return Err(err);
            }
        };
        let opens_body = header.opens_body || self.consume_lone_open_brace();

        let mut valid = true;
        let checks = [
            (NameRole::Schema, header.schema),
            (NameRole::Table, Some(header.name)),
            (NameRole::Alias, header.alias),
        ];
        for (role, name) in checks {
            if let Some(name) = name.filter(|n| !is_valid_identifier(n)) {
                self.report(
                    line,
                    DslError::InvalidIdentifier {
                        role,
                        name: name.to_string(),
                    },
                );
                valid = false;
            }
        }
        if !valid {
            if opens_body {
                self.skip_block_body(line, "Table", 1);
            }
            return Ok(());
        }

        if self
            .tables
            .iter()
            .any(|t| t.is_named(header.schema, header.name))
        {
            if opens_body {
                self.skip_block_body(line, "Table", 1);
            }
            let name = match header.schema {
                Some(schema) => format!("{}.{schema}", header.name),
                None => header.name.to_string(),
            };
            return Err(DslError::DuplicateTable { name });
        }

        let mut table = Table::new(
            self.ids.next(EntityKind::Table),
            to_identifier(header.name)?,
            header.schema.map(to_identifier).transpose()?,
        );
        table.alias = header.alias.map(to_identifier).transpose()?;
        if table.schema.is_some() {
            self.use_feature("schemas");
        }

        if let Some(inner) = header.settings {
            self.apply_table_settings(line, &mut table, inner);
        }
        if opens_body {
            self.parse_table_body(line, &mut table)?;
        }

        debug!(table = %table.qualified_name(), columns = table.columns.len(), "table parsed");
        self.tables.push(table);
        Ok(())
    }

    fn apply_table_settings(&mut self, line: &SourceLine, table: &mut Table, inner: &str) {
        for setting in parse_settings(inner) {
            if setting.key == SettingKey::Note {
                if let Some(value) = setting.value {
                    self.use_feature("notes");
                    table.note = Some(value);
                    continue;
                }
            }
            self.use_feature("custom_properties");
            self.report(
                line,
                DslError::UnknownSetting {
                    key: setting.name.clone(),
                },
            );
            table.custom_properties.insert(
                setting.name,
                setting.value.map_or(PropertyValue::Flag(true), PropertyValue::Text),
            );
        }
    }

    fn parse_table_body(&mut self, header: &SourceLine, table: &mut Table) -> Result<(), DslError> {
        loop {
            let Some(line) = self.peek() else {
                self.report(
                    header,
                    DslError::UnterminatedBlock {
                        construct: "Table".to_string(),
                    },
                );
                return Ok(());
            };

            let kind = classify(&line.text);
            if starts_top_level_block(kind, &line.text) {
                // Missing '}': leave this line for top-level dispatch.
                self.report(
                    header,
                    DslError::UnterminatedBlock {
                        construct: "Table".to_string(),
                    },
                );
                return Ok(());
            }

            self.cursor += 1;
            let result = match kind {
                LineKind::Brace if line.text.starts_with('}') => {
                    let rest = line.text[1..].trim();
                    if !rest.is_empty() {
                        self.report(
                            line,
                            DslError::UnrecognizedSyntax {
                                text: rest.to_string(),
                            },
                        );
                    }
                    return Ok(());
                }
                LineKind::Brace => Err(DslError::UnrecognizedSyntax {
                    text: line.text.clone(),
                }),
                LineKind::NoteLine => {
                    self.apply_table_note(line, table);
                    Ok(())
                }
                LineKind::Indexes => {
                    self.use_feature("indexes");
                    let (opens, closes) = brace_balance(&line.text);
                    if opens > closes {
                        self.skip_block_body(line, "indexes", opens - closes);
                    } else if opens == 0 && self.consume_lone_open_brace() {
                        self.skip_block_body(line, "indexes", 1);
                    }
                    Err(DslError::UnsupportedConstruct {
                        keyword: Keyword::Indexes.as_str().to_string(),
                    })
                }
                _ => self.parse_column(line, table),
            };
            self.settle(line, result)?;
        }
    }

    fn apply_table_note(&mut self, line: &SourceLine, table: &mut Table) {
        let value = line
            .text
            .split_once(':')
            .map(|(_, v)| v.trim())
            .unwrap_or_default();
        self.use_feature("notes");
        table.note = Some(unquote(value));
    }

    // -- Columns --

    fn parse_column(&mut self, line: &'a SourceLine, table: &mut Table) -> Result<(), DslError> {
        let split = split_settings_list(&line.text)?;
        if !split.trailing.is_empty() {
            return Err(DslError::MalformedColumn {
                reason: format!("unexpected '{}' after settings", split.trailing),
            });
        }

        let (name, quoted, rest) = split_column_name(split.head)?;
        let column_type = parse_column_type(rest)?;

        if !quoted && !is_valid_identifier(&name) {
            return Err(DslError::InvalidIdentifier {
                role: NameRole::Column,
                name,
            });
        }
        if table.column(&name).is_some() {
            return Err(DslError::DuplicateColumn {
                table: table.qualified_name(),
                name,
            });
        }

        let mut column = Column::new(self.ids.next(EntityKind::Column), name, column_type);
        if let Some(inner) = split.settings {
            self.apply_column_settings(line, table, &mut column, inner)?;
        }
        table.columns.push(column);
        Ok(())
    }

    fn apply_column_settings(
        &mut self,
        line: &'a SourceLine,
        table: &Table,
        column: &mut Column,
        inner: &str,
    ) -> Result<(), DslError> {
        for setting in parse_settings(inner) {
            match setting.key {
                SettingKey::PrimaryKey => column.primary_key = true,
                SettingKey::NotNull => column.not_null = true,
                SettingKey::Null => column.not_null = false,
                SettingKey::Unique => column.unique = true,
                SettingKey::Default | SettingKey::Note if setting.value.is_none() => {
                    self.report(
                        line,
                        DslError::MalformedColumn {
                            reason: format!("setting '{}' requires a value", setting.name),
                        },
                    );
                }
                SettingKey::Default => column.default = setting.value,
                SettingKey::Note => {
                    self.use_feature("notes");
                    column.note = setting.value;
                }
                SettingKey::Ref => {
                    let result =
                        self.apply_inline_ref(line, table, column, setting.value.as_deref());
                    self.settle(line, result)?;
                }
                SettingKey::Delete | SettingKey::Update | SettingKey::Other => {
                    self.use_feature("custom_properties");
                    self.report(
                        line,
                        DslError::UnknownSetting {
                            key: setting.name.clone(),
                        },
                    );
                    column.custom_properties.insert(
                        setting.name,
                        setting.value.map_or(PropertyValue::Flag(true), PropertyValue::Text),
                    );
                }
            }
        }
        Ok(())
    }

    /// `ref: <symbol> table[.schema].column` inside a column's settings.
    ///
    /// The target is not checked here; see [`Self::resolve_inline_references`].
    fn apply_inline_ref(
        &mut self,
        line: &'a SourceLine,
        table: &Table,
        column: &mut Column,
        value: Option<&str>,
    ) -> Result<(), DslError> {
        let value = value.ok_or_else(|| DslError::MalformedReference {
            reason: "'ref' setting requires a target, e.g. ref: > users.id".to_string(),
        })?;
        let (kind, target) = parse_inline_target(value)?;
        self.use_feature("inline_references");

        column.foreign_key = true;
        column.inline_ref = Some(InlineRef {
            kind,
            to_schema: target.schema.clone(),
            to_table: target.table.clone(),
            to_column: target.column.clone(),
        });
        self.references.push(Reference {
            id: self.ids.next(EntityKind::Reference),
            name: None,
            from_schema: table.schema.as_ref().map(|s| s.to_string()),
            from_table: table.name.to_string(),
            from_column: column.name.clone(),
            to_schema: target.schema.clone(),
            to_table: target.table.clone(),
            to_column: target.column.clone(),
            kind,
            on_delete: None,
            on_update: None,
        });
        self.pending_inline.push(PendingInline { line, target });
        Ok(())
    }

    /// Checks inline targets against every table read, reporting misses as
    /// warnings. The references themselves are kept.
    fn resolve_inline_references(&mut self) {
        let pending = std::mem::take(&mut self.pending_inline);
        for PendingInline { line, target } in pending {
            let table = find_table_in(&self.tables, target.schema.as_deref(), &target.table);
            let missing = match table {
                None => Some(target.table_display()),
                Some(table) if table.column(&target.column).is_none() => Some(target.to_string()),
                Some(_) => None,
            };
            if let Some(target) = missing {
                self.report(line, DslError::UnresolvedInlineReference { target });
            }
        }
    }

    // -- Standalone references --

    fn parse_standalone_ref(&mut self, line: &'a SourceLine) -> Result<(), DslError> {
        self.cursor += 1;
        self.use_feature("references");

        // classify() guarantees the line starts with the three-letter keyword.
        let body = line.text.get(3..).unwrap_or_default().trim_start();

        if let Some((name_part, expr)) = body.split_once(':') {
            let name = parse_ref_name(name_part)?;
            return self.add_standalone_ref(line, name, expr.trim());
        }

        let (name_part, opens_body) = match body.strip_suffix('{') {
            Some(name_part) => (name_part, true),
            None => (body, self.consume_lone_open_brace()),
        };
        if !opens_body {
            return Err(DslError::MalformedReference {
                reason: "expected ':' or '{' after Ref".to_string(),
            });
        }
        let name = parse_ref_name(name_part)?;

        while let Some(inner) = self.peek() {
            if starts_top_level_block(classify(&inner.text), &inner.text) {
                break;
            }
            self.cursor += 1;
            if inner.text.starts_with('}') {
                return Ok(());
            }
            let result = self.add_standalone_ref(inner, name.clone(), &inner.text);
            self.settle(inner, result)?;
        }
        Err(DslError::UnterminatedBlock {
            construct: "Ref".to_string(),
        })
    }

    fn add_standalone_ref(
        &mut self,
        line: &SourceLine,
        name: Option<String>,
        expr: &str,
    ) -> Result<(), DslError> {
        let split = split_settings_list(expr)?;
        if !split.trailing.is_empty() {
            return Err(DslError::MalformedReference {
                reason: format!("unexpected '{}' after settings", split.trailing),
            });
        }
        let relation = parse_relation(split.head)?;

        let from_idx = self.table_index(&relation.from)?;
        let to_idx = self.table_index(&relation.to)?;
        for (idx, endpoint) in [(from_idx, &relation.from), (to_idx, &relation.to)] {
            if self.tables[idx].column(&endpoint.column).is_none() {
                return Err(DslError::ColumnNotFound {
                    table: endpoint.table_display(),
                    column: endpoint.column.clone(),
                });
            }
        }

        let (from_table, to_table) = (&self.tables[from_idx], &self.tables[to_idx]);
        let mut reference = Reference {
            id: self.ids.next(EntityKind::Reference),
            name,
            from_schema: from_table.schema.as_ref().map(|s| s.to_string()),
            from_table: from_table.name.to_string(),
            from_column: relation.from.column.clone(),
            to_schema: to_table.schema.as_ref().map(|s| s.to_string()),
            to_table: to_table.name.to_string(),
            to_column: relation.to.column.clone(),
            kind: relation.kind,
            on_delete: None,
            on_update: None,
        };

        if let Some(inner) = split.settings {
            self.apply_ref_settings(line, &mut reference, inner);
        }

        self.tables[from_idx]
            .column_mut(&relation.from.column)
            .ok_or_else(|| DslError::Internal {
                message: format!("column {} vanished after lookup", relation.from),
            })?
            .foreign_key = true;
        self.references.push(reference);
        Ok(())
    }

    fn apply_ref_settings(&mut self, line: &SourceLine, reference: &mut Reference, inner: &str) {
        for setting in parse_settings(inner) {
            let slot = match setting.key {
                SettingKey::Delete => &mut reference.on_delete,
                SettingKey::Update => &mut reference.on_update,
                _ => {
                    self.report(line, DslError::UnknownSetting { key: setting.name });
                    continue;
                }
            };
            let value = setting.value.unwrap_or_default();
            match value.parse::<ReferentialAction>() {
                Ok(action) => *slot = Some(action),
                Err(_) => self.report(line, DslError::UnknownReferentialAction { value }),
            }
        }
    }

    fn table_index(&self, endpoint: &Endpoint) -> Result<usize, DslError> {
        let table = find_table_in(&self.tables, endpoint.schema.as_deref(), &endpoint.table)
            .ok_or_else(|| DslError::TableNotFound {
                name: endpoint.table_display(),
            })?;
        self.tables
            .iter()
            .position(|t| t.id == table.id)
            .ok_or_else(|| DslError::Internal {
                message: format!("table {} found but not indexed", table.qualified_name()),
            })
    }

    fn finish(self, started: Instant, comment_lines: usize) -> ParseResult {
        let lines_processed = self.cursor.min(self.lines.len());
        let (errors, warnings) = self.diagnostics.into_sorted();
        ParseResult {
            schema: Schema {
                tables: self.tables,
                references: self.references,
                metadata: SchemaMetadata::default(),
            },
            errors,
            warnings,
            metadata: ParseMetadata {
                parse_time: started.elapsed(),
                lines_processed,
                comment_lines,
                features_used: self.features.into_iter().map(String::from).collect(),
            },
        }
    }
}

// -- Line grammars --

/// `Table name[.schema] [as alias] [settings] {`
fn parse_table_header(text: &str) -> Result<TableHeader<'_>, DslError> {
    let rest = text.get(5..).unwrap_or_default().trim();
    let empty_body = rest
        .strip_suffix('}')
        .and_then(|r| r.trim_end().strip_suffix('{'));
    let (rest, opens_body) = if let Some(r) = empty_body {
        (r.trim_end(), false)
    } else if let Some(r) = rest.strip_suffix('{') {
        (r.trim_end(), true)
    } else {
        (rest, false)
    };

    let split = split_settings_list(rest)?;
    if !split.trailing.is_empty() {
        return Err(DslError::MalformedTableHeader {
            reason: format!("unexpected '{}' after settings", split.trailing),
        });
    }

    let parts: Vec<&str> = split.head.split_whitespace().collect();
    let (qualified, alias) = match parts.as_slice() {
        [] => {
            return Err(DslError::MalformedTableHeader {
                reason: "missing table name".to_string(),
            })
        }
        [qualified] => (*qualified, None),
        [qualified, kw, alias] if kw.eq_ignore_ascii_case("as") => (*qualified, Some(*alias)),
        [_, extra @ ..] => {
            return Err(DslError::MalformedTableHeader {
                reason: format!("unexpected '{}' after table name", extra.join(" ")),
            })
        }
    };

    let (name, schema) = match qualified.split_once('.') {
        None => (qualified, None),
        Some((name, schema)) if !schema.contains('.') => (name, Some(schema)),
        Some(_) => {
            return Err(DslError::MalformedTableHeader {
                reason: format!("'{qualified}' has more than one '.'"),
            })
        }
    };

    Ok(TableHeader {
        schema,
        name,
        alias,
        settings: split.settings,
        opens_body,
    })
}

/// Splits the column name off a column head. Returns (name, was_quoted, rest).
fn split_column_name(head: &str) -> Result<(String, bool, &str), DslError> {
    if let Some(quote) = head.chars().next().filter(|c| matches!(c, '"' | '\'' | '`')) {
        let close = find_closing_quote(head, quote).ok_or_else(|| DslError::MalformedColumn {
            reason: "unterminated quoted column name".to_string(),
        })?;
        let rest = &head[close + 1..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Err(DslError::MalformedColumn {
                reason: "expected whitespace after quoted column name".to_string(),
            });
        }
        return Ok((unescape(&head[1..close]), true, rest.trim_start()));
    }

    match head.split_once(char::is_whitespace) {
        Some((name, rest)) => Ok((name.to_string(), false, rest.trim_start())),
        None => Err(DslError::MalformedColumn {
            reason: format!("missing type after column name '{head}'"),
        }),
    }
}

/// Reads `type`, `type(args)`, `type[]` or a quoted type; nothing may follow.
fn parse_column_type(rest: &str) -> Result<String, DslError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(DslError::MalformedColumn {
            reason: "missing column type".to_string(),
        });
    }

    let opening_quote = rest.chars().next().filter(|c| matches!(c, '"' | '\''));
    let (column_type, trailing) = if let Some(quote) = opening_quote {
        let close = find_closing_quote(rest, quote).ok_or_else(|| DslError::MalformedColumn {
            reason: "unterminated quoted column type".to_string(),
        })?;
        (unescape(&rest[1..close]), rest[close + 1..].trim())
    } else {
        let mut depth = 0usize;
        let mut end = rest.len();
        for (i, c) in rest.char_indices() {
            match c {
                '(' => depth += 1,
                ')' if depth == 0 => {
                    return Err(DslError::MalformedColumn {
                        reason: format!("unbalanced ')' in column type '{rest}'"),
                    })
                }
                ')' => depth -= 1,
                c if c.is_whitespace() && depth == 0 => {
                    end = i;
                    break;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(DslError::MalformedColumn {
                reason: format!("unclosed '(' in column type '{rest}'"),
            });
        }
        (rest[..end].to_string(), rest[end..].trim())
    };

    if !trailing.is_empty() {
        return Err(DslError::MalformedColumn {
            reason: format!(
                "unexpected '{trailing}' after column type; settings go in brackets, e.g. [{trailing}]"
            ),
        });
    }
    if column_type.is_empty() {
        return Err(DslError::MalformedColumn {
            reason: "empty column type".to_string(),
        });
    }
    Ok(column_type)
}

/// Byte index of the quote closing the one at index 0, honoring `\` escapes.
fn find_closing_quote(s: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(i);
        }
    }
    None
}

fn parse_ref_name(text: &str) -> Result<Option<String>, DslError> {
    let name = text.trim();
    if name.is_empty() {
        return Ok(None);
    }
    if name.contains(char::is_whitespace) {
        return Err(DslError::MalformedReference {
            reason: format!("reference name '{name}' must be a single word"),
        });
    }
    Ok(Some(name.to_string()))
}

/// `a.col <symbol> b.col`
fn parse_relation(text: &str) -> Result<Relation, DslError> {
    let tokens = lex_reference(text)?;
    let mut pos = 0;
    let from = parse_endpoint(&tokens, &mut pos)?;
    let kind = parse_symbol(&tokens, &mut pos)?;
    let to = parse_endpoint(&tokens, &mut pos)?;
    expect_end(&tokens, pos)?;
    Ok(Relation { from, kind, to })
}

/// `<symbol> b.col`, the value of an inline `ref:` setting.
fn parse_inline_target(text: &str) -> Result<(RelationKind, Endpoint), DslError> {
    let tokens = lex_reference(text)?;
    let mut pos = 0;
    let kind = parse_symbol(&tokens, &mut pos)?;
    let to = parse_endpoint(&tokens, &mut pos)?;
    expect_end(&tokens, pos)?;
    Ok((kind, to))
}

fn lex_reference(text: &str) -> Result<Vec<SpannedToken<'_>>, DslError> {
    match lex_prefix(text) {
        (tokens, None) => Ok(tokens),
        (_, Some(offset)) => Err(DslError::MalformedReference {
            reason: format!("unexpected character in '{}'", &text[offset..]),
        }),
    }
}

fn parse_endpoint(tokens: &[SpannedToken<'_>], pos: &mut usize) -> Result<Endpoint, DslError> {
    let mut parts = Vec::new();
    loop {
        match tokens.get(*pos) {
            Some(t) if t.token == Token::Ident => parts.push(t.text.to_string()),
            Some(t) if t.token == Token::StringLiteral => parts.push(unquote(t.text)),
            Some(t) if t.token == Token::LParen => {
                return Err(DslError::MalformedReference {
                    reason: "composite references are not supported".to_string(),
                })
            }
            Some(t) => {
                return Err(DslError::MalformedReference {
                    reason: format!("expected table.column, found {} ('{}')", t.token, t.text),
                })
            }
            None => {
                return Err(DslError::MalformedReference {
                    reason: "expected table.column, found end of line".to_string(),
                })
            }
        }
        *pos += 1;
        if tokens.get(*pos).map(|t| t.token) == Some(Token::Dot) {
            *pos += 1;
        } else {
            break;
        }
    }

    let mut parts = parts.into_iter();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(table), Some(column), None, None) => Ok(Endpoint {
            schema: None,
            table,
            column,
        }),
        (Some(table), Some(schema), Some(column), None) => Ok(Endpoint {
            schema: Some(schema),
            table,
            column,
        }),
        _ => Err(DslError::MalformedReference {
            reason: "expected table.column or table.schema.column".to_string(),
        }),
    }
}

fn parse_symbol(tokens: &[SpannedToken<'_>], pos: &mut usize) -> Result<RelationKind, DslError> {
    match tokens.get(*pos) {
        Some(t) if t.token.is_relation_symbol() => {
            *pos += 1;
            RelationKind::from_symbol(t.text).map_err(|e| DslError::MalformedReference {
                reason: e.to_string(),
            })
        }
        Some(t) => Err(DslError::MalformedReference {
            reason: format!("expected one of -, >, <, <>, found '{}'", t.text),
        }),
        None => Err(DslError::MalformedReference {
            reason: "expected one of -, >, <, <>, found end of line".to_string(),
        }),
    }
}

fn expect_end(tokens: &[SpannedToken<'_>], pos: usize) -> Result<(), DslError> {
    match tokens.get(pos) {
        None => Ok(()),
        Some(t) => Err(DslError::MalformedReference {
            reason: format!("unexpected '{}' after reference target", t.text),
        }),
    }
}

/// Counts `{` and `}` outside quoted spans.
fn brace_balance(text: &str) -> (usize, usize) {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let (mut opens, mut closes) = (0, 0);
    for c in text.chars() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '{' => opens += 1,
                '}' => closes += 1,
                _ => {}
            },
        }
    }
    (opens, closes)
}

/// Inside a block body: does this line look like the start of the next
/// top-level construct, meaning the block's `}` is missing?
fn starts_top_level_block(kind: LineKind, text: &str) -> bool {
    match kind {
        LineKind::Table | LineKind::Enum | LineKind::Project | LineKind::TableGroup => {
            text.ends_with('{')
        }
        LineKind::Ref => text.split_once(':').is_some_and(|(head, _)| {
            !head.contains('[') && head.split_whitespace().count() <= 2
        }),
        _ => false,
    }
}

fn to_identifier(name: &str) -> Result<Identifier, DslError> {
    Identifier::new(name).map_err(|e| DslError::Internal {
        message: format!("identifier accepted by validation was rejected: {e}"),
    })
}

/// Parses notation text into a schema plus diagnostics.
///
/// Never fails: line-scoped problems are reported in the result and the
/// offending construct is dropped. Each call starts from fresh state.
pub fn parse(source: &str) -> ParseResult {
    let started = Instant::now();
    let lines = preprocess(source);
    let mut ctx = ParseContext::new(&lines);
    ctx.run();
    let result = ctx.finish(started, count_comment_lines(source));
    debug!(
        tables = result.schema.tables.len(),
        references = result.schema.references.len(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "parse finished"
    );
    result
}
