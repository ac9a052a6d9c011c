use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of entity an [`EntityId`] identifies. Doubles as the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Table,
    Column,
    Reference,
}

impl EntityKind {
    /// Returns the prefix used in the string form of ids of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Column => "column",
            Self::Reference => "ref",
        }
    }
}

/// A sequential, prefixed entity identifier such as `table_1` or `ref_3`.
///
/// Ids are allocated from counters owned by a single parse, so the same input
/// always yields the same ids and nothing is shared between invocations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Builds the id for the `seq`-th entity of `kind`.
    pub fn new(kind: EntityKind, seq: u32) -> Self {
        Self(format!("{}_{seq}", kind.prefix()))
    }

    /// Returns the string representation of this id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-parse id allocator. One counter per [`EntityKind`], all starting at 1.
#[derive(Debug, Default)]
pub struct IdCounters {
    tables: u32,
    columns: u32,
    references: u32,
}

impl IdCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id for `kind`.
    pub fn next(&mut self, kind: EntityKind) -> EntityId {
        let counter = match kind {
            EntityKind::Table => &mut self.tables,
            EntityKind::Column => &mut self.columns,
            EntityKind::Reference => &mut self.references,
        };
        *counter += 1;
        EntityId::new(kind, *counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_have_kind_prefix() {
        assert_eq!(EntityId::new(EntityKind::Table, 1).as_str(), "table_1");
        assert_eq!(EntityId::new(EntityKind::Column, 12).as_str(), "column_12");
        assert_eq!(EntityId::new(EntityKind::Reference, 2).as_str(), "ref_2");
    }

    #[test]
    fn counters_are_independent_per_kind() {
        let mut ids = IdCounters::new();
        assert_eq!(ids.next(EntityKind::Table).as_str(), "table_1");
        assert_eq!(ids.next(EntityKind::Column).as_str(), "column_1");
        assert_eq!(ids.next(EntityKind::Column).as_str(), "column_2");
        assert_eq!(ids.next(EntityKind::Table).as_str(), "table_2");
    }

    #[test]
    fn fresh_counters_restart() {
        let mut first = IdCounters::new();
        first.next(EntityKind::Reference);
        first.next(EntityKind::Reference);
        let mut second = IdCounters::new();
        assert_eq!(second.next(EntityKind::Reference).as_str(), "ref_1");
    }

    #[test]
    fn serde_is_transparent() {
        let id = EntityId::new(EntityKind::Table, 7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"table_7\"");
    }
}
