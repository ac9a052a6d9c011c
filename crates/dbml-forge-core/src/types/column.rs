use serde::{Deserialize, Serialize};

use super::custom_property::CustomProperties;
use super::entity_id::EntityId;
use super::identifier::is_valid_identifier;
use super::relation_kind::RelationKind;

/// A foreign-key relation declared inside a column's settings (`ref: > users.id`).
///
/// The owning column is always the "from" side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineRef {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_schema: Option<String>,
    pub to_table: String,
    pub to_column: String,
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: EntityId,
    /// Bare identifier, or any text when the column was declared with a
    /// quoted name.
    pub name: String,
    /// Free-form type text, including any precision suffix (`varchar(255)`).
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub foreign_key: bool,
    /// Raw default literal with outer quotes removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_ref: Option<InlineRef>,
    #[serde(default, skip_serializing_if = "CustomProperties::is_empty")]
    pub custom_properties: CustomProperties,
}

impl Column {
    /// Creates a column with every flag cleared and no settings.
    pub fn new(id: EntityId, name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            column_type: column_type.into(),
            primary_key: false,
            not_null: false,
            unique: false,
            foreign_key: false,
            default: None,
            note: None,
            inline_ref: None,
            custom_properties: CustomProperties::new(),
        }
    }

    /// Returns true if the name must be written quoted to reparse.
    pub fn needs_quoted_name(&self) -> bool {
        !is_valid_identifier(&self.name)
    }

    /// Returns true if any setting would be written in a settings list.
    pub fn has_settings(&self) -> bool {
        self.primary_key
            || self.not_null
            || self.unique
            || self.default.is_some()
            || self.note.is_some()
            || self.inline_ref.is_some()
            || !self.custom_properties.is_empty()
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.column_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::entity_id::EntityKind;
    use crate::types::custom_property::PropertyValue;

    fn column(name: &str, ty: &str) -> Column {
        Column::new(EntityId::new(EntityKind::Column, 1), name, ty)
    }

    #[test]
    fn new_column_has_no_settings() {
        let c = column("id", "integer");
        assert!(!c.has_settings());
        assert!(!c.foreign_key);
        assert_eq!(c.to_string(), "id integer");
    }

    #[test]
    fn settings_detection() {
        let mut c = column("id", "integer");
        c.primary_key = true;
        assert!(c.has_settings());

        let mut c = column("x", "int");
        c.custom_properties
            .insert("increment".into(), PropertyValue::Flag(true));
        assert!(c.has_settings());
    }

    #[test]
    fn foreign_key_alone_is_not_a_setting() {
        let mut c = column("user_id", "integer");
        c.foreign_key = true;
        assert!(!c.has_settings());
    }

    #[test]
    fn quoted_name_detection() {
        assert!(!column("user_id", "int").needs_quoted_name());
        assert!(column("first name", "text").needs_quoted_name());
        assert!(column("2fa", "bool").needs_quoted_name());
    }

    #[test]
    fn serde_uses_camel_case() {
        let mut c = column("id", "integer");
        c.primary_key = true;
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["primaryKey"], true);
        assert_eq!(json["type"], "integer");
        assert!(json.get("default").is_none());
        let back: Column = serde_json::from_value(json).unwrap();
        assert_eq!(c, back);
    }
}
