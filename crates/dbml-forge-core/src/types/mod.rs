mod column;
mod custom_property;
mod diagnostic;
mod entity_id;
mod identifier;
mod reference;
mod referential_action;
mod relation_kind;
mod schema;
mod table;

pub use column::{Column, InlineRef};
pub use custom_property::{CustomProperties, PropertyValue};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use entity_id::{EntityId, EntityKind, IdCounters};
pub use identifier::{is_valid_identifier, sanitize_identifier, Identifier};
pub use reference::Reference;
pub use referential_action::ReferentialAction;
pub use relation_kind::RelationKind;
pub use schema::{find_table_in, Schema, SchemaMetadata};
pub use table::Table;
