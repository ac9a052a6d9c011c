use serde::{Deserialize, Serialize};

use super::column::Column;
use super::custom_property::CustomProperties;
use super::entity_id::EntityId;
use super::identifier::Identifier;

/// A table: qualified name, ordered columns, and pass-through metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: EntityId,
    pub name: Identifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Identifier>,
    /// Declaration order is significant and preserved by the generator.
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Position/size hints owned by the host editor; never examined here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "CustomProperties::is_empty")]
    pub custom_properties: CustomProperties,
}

impl Table {
    /// Creates an empty table.
    pub fn new(id: EntityId, name: Identifier, schema: Option<Identifier>) -> Self {
        Self {
            id,
            name,
            schema,
            alias: None,
            columns: Vec::new(),
            note: None,
            layout: None,
            custom_properties: CustomProperties::new(),
        }
    }

    /// `name.schema` as written in a header, or just `name` when unqualified.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{schema}", self.name),
            None => self.name.to_string(),
        }
    }

    /// Returns true if this table has exactly the given (schema, name) pair.
    pub fn is_named(&self, schema: Option<&str>, name: &str) -> bool {
        self.name.as_str() == name && self.schema.as_ref().map(Identifier::as_str) == schema
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a column by name, mutably.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}
