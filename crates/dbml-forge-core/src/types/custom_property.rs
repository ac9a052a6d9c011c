use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The value of a setting the core does not interpret.
///
/// A setting written with a value (`color: red`) keeps the raw value text;
/// a bare flag (`increment`) is stored as `Flag(true)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Flag(bool),
    Text(String),
}

impl PropertyValue {
    /// Returns the raw text for `Text` values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Flag(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Open, insertion-ordered bag of unrecognized settings keyed by their
/// lower-cased name.
pub type CustomProperties = IndexMap<String, PropertyValue>;
