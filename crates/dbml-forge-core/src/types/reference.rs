use serde::{Deserialize, Serialize};

use super::column::InlineRef;
use super::entity_id::EntityId;
use super::referential_action::ReferentialAction;
use super::relation_kind::RelationKind;

/// A relation between two columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_schema: Option<String>,
    pub from_table: String,
    pub from_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_schema: Option<String>,
    pub to_table: String,
    pub to_column: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

impl Reference {
    /// Returns true if `inline`, declared on `from_table.from_column`,
    /// describes this same relation.
    ///
    /// A reference that carries a name or referential actions is never
    /// considered inline, since the inline form cannot express those.
    pub fn matches_inline(
        &self,
        from_schema: Option<&str>,
        from_table: &str,
        from_column: &str,
        inline: &InlineRef,
    ) -> bool {
        self.name.is_none()
            && self.on_delete.is_none()
            && self.on_update.is_none()
            && self.kind == inline.kind
            && self.from_schema.as_deref() == from_schema
            && self.from_table == from_table
            && self.from_column == from_column
            && self.to_schema == inline.to_schema
            && self.to_table == inline.to_table
            && self.to_column == inline.to_column
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} {} {}.{}",
            self.from_table,
            self.from_column,
            self.kind.symbol(),
            self.to_table,
            self.to_column
        )
    }
}
