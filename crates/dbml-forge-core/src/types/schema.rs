use serde::{Deserialize, Serialize};

use super::reference::Reference;
use super::table::Table;

/// Descriptive metadata attached to every schema snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMetadata {
    pub name: String,
    pub version: String,
    pub database_type: String,
}

impl Default for SchemaMetadata {
    fn default() -> Self {
        Self {
            name: "Untitled Schema".to_string(),
            version: "1.0.0".to_string(),
            database_type: "generic".to_string(),
        }
    }
}

/// A complete schema snapshot: tables and references in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub metadata: SchemaMetadata,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a table by optional schema qualifier and name.
    ///
    /// With a qualifier the match is exact. Without one, an unqualified table
    /// is preferred, falling back to the first table of that name in any schema.
    pub fn find_table(&self, schema: Option<&str>, name: &str) -> Option<&Table> {
        find_table_in(&self.tables, schema, name)
    }

    /// Table names in declaration order, qualified where applicable.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(Table::qualified_name).collect()
    }

    /// Total number of columns across all tables.
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}

/// Table lookup shared by [`Schema::find_table`] and callers that hold a bare
/// table slice (the parser, while the schema is still being built).
pub fn find_table_in<'a>(
    tables: &'a [Table],
    schema: Option<&str>,
    name: &str,
) -> Option<&'a Table> {
    match schema {
        Some(_) => tables.iter().find(|t| t.is_named(schema, name)),
        None => tables
            .iter()
            .find(|t| t.is_named(None, name))
            .or_else(|| tables.iter().find(|t| t.name.as_str() == name)),
    }
}
