//! Declarative property schemas.
//!
//! # Responsibility
//! - Describe the ordered `(name, type)` declarations an expando starts with.
//! - Parse the compact `name:type` form used on the command line.
//!
//! # Invariants
//! - Declaration order is preserved; `TypedExpando::from_schema` applies it
//!   in order, so repeated names fail with `DuplicateProperty`.

use crate::model::type_tag::{TypeParseError, TypeTag};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:\s]+)\s*:\s*(\S.*?)\s*$").expect("valid declaration regex")
});

/// One declared property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    /// Serialized as `type` in text form, e.g. `"int?"`.
    #[serde(rename = "type")]
    pub property_type: TypeTag,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, property_type: TypeTag) -> Self {
        Self {
            name: name.into(),
            property_type,
        }
    }
}

/// Ordered list of property declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(default)]
    pub properties: Vec<PropertyDeclaration>,
}

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a declaration, builder style.
    pub fn with(mut self, name: impl Into<String>, property_type: TypeTag) -> Self {
        self.properties
            .push(PropertyDeclaration::new(name, property_type));
        self
    }

    /// Parses one `name:type` declaration.
    pub fn parse_declaration(value: &str) -> Result<PropertyDeclaration, SchemaError> {
        let captures = DECLARATION_RE
            .captures(value)
            .ok_or_else(|| SchemaError::InvalidDeclaration(value.trim().to_string()))?;
        let property_type = captures[2]
            .parse::<TypeTag>()
            .map_err(|source| SchemaError::InvalidType {
                name: captures[1].to_string(),
                source,
            })?;
        Ok(PropertyDeclaration::new(&captures[1], property_type))
    }
}

impl FromIterator<PropertyDeclaration> for PropertySchema {
    fn from_iter<I: IntoIterator<Item = PropertyDeclaration>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().collect(),
        }
    }
}

/// Schema parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidDeclaration(String),
    InvalidType {
        name: String,
        source: TypeParseError,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDeclaration(value) => {
                write!(f, "property declaration is invalid: `{value}` (expected name:type)")
            }
            Self::InvalidType { name, source } => {
                write!(f, "property `{name}` has an invalid type: {source}")
            }
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidType { source, .. } => Some(source),
            Self::InvalidDeclaration(_) => None,
        }
    }
}
