use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Cardinality of a reference, derived from its relationship symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// `-`
    OneToOne,
    /// `>`
    OneToMany,
    /// `<`
    ManyToOne,
    /// `<>`
    ManyToMany,
}

impl RelationKind {
    /// Maps a relationship symbol to its kind.
    ///
    /// A symbol containing both `<` and `>` is many-to-many regardless of
    /// what else it contains.
    pub fn from_symbol(symbol: &str) -> Result<Self, SchemaError> {
        let has_lt = symbol.contains('<');
        let has_gt = symbol.contains('>');
        match (has_lt, has_gt) {
            (true, true) => Ok(Self::ManyToMany),
            (false, true) => Ok(Self::OneToMany),
            (true, false) => Ok(Self::ManyToOne),
            (false, false) if symbol == "-" => Ok(Self::OneToOne),
            _ => Err(SchemaError::UnknownRelationSymbol(symbol.to_string())),
        }
    }

    /// The canonical symbol written by the generator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::OneToOne => "-",
            Self::OneToMany => ">",
            Self::ManyToOne => "<",
            Self::ManyToMany => "<>",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneToOne => write!(f, "one-to-one"),
            Self::OneToMany => write!(f, "one-to-many"),
            Self::ManyToOne => write!(f, "many-to-one"),
            Self::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_mapping() {
        assert_eq!(RelationKind::from_symbol("-").unwrap(), RelationKind::OneToOne);
        assert_eq!(RelationKind::from_symbol(">").unwrap(), RelationKind::OneToMany);
        assert_eq!(RelationKind::from_symbol("<").unwrap(), RelationKind::ManyToOne);
        assert_eq!(RelationKind::from_symbol("<>").unwrap(), RelationKind::ManyToMany);
    }

    #[test]
    fn both_angles_win() {
        assert_eq!(RelationKind::from_symbol("><").unwrap(), RelationKind::ManyToMany);
    }

    #[test]
    fn unknown_symbol() {
        assert!(RelationKind::from_symbol("=").is_err());
        assert!(RelationKind::from_symbol("").is_err());
        assert!(RelationKind::from_symbol("--").is_err());
    }

    #[test]
    fn symbol_inverts_mapping() {
        for kind in [
            RelationKind::OneToOne,
            RelationKind::OneToMany,
            RelationKind::ManyToOne,
            RelationKind::ManyToMany,
        ] {
            assert_eq!(RelationKind::from_symbol(kind.symbol()).unwrap(), kind);
        }
    }

    #[test]
    fn display_and_serde_agree() {
        let json = serde_json::to_string(&RelationKind::OneToMany).unwrap();
        assert_eq!(json, "\"one-to-many\"");
        assert_eq!(RelationKind::OneToMany.to_string(), "one-to-many");
    }
}
