//! Container error taxonomy.
//!
//! # Invariants
//! - `TypeMismatch` is always reported before any mutation happens.
//! - "Not found" and "not writable" are reported as `false` by the chain
//!   try-operations; only strict accessors map them to `UnknownProperty`.

use crate::model::type_tag::TypeTag;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ExpandoResult<T> = Result<T, ExpandoError>;

/// Errors raised by extensions, the extension chain and `TypedExpando`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandoError {
    /// Name is already registered in the target extension.
    DuplicateProperty(String),
    /// No layer resolves the name.
    UnknownProperty(String),
    /// Written value is not assignable to the declared type.
    TypeMismatch {
        property: String,
        expected: TypeTag,
        /// `None` when the rejected value was `Null`.
        actual: Option<TypeTag>,
    },
    /// Typed list construction hit an item the element type rejects.
    InvalidListItem {
        element: TypeTag,
        index: usize,
        actual: Option<TypeTag>,
    },
    /// Extension handle does not belong to this chain.
    ExtensionNotRegistered(Uuid),
}

impl Display for ExpandoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateProperty(name) => write!(f, "property already exists: {name}"),
            Self::UnknownProperty(name) => write!(f, "property does not exist: {name}"),
            Self::TypeMismatch {
                property,
                expected,
                actual,
            } => write!(
                f,
                "value of type {} is not compatible with property `{property}` of type {expected}",
                type_name(actual)
            ),
            Self::InvalidListItem {
                element,
                index,
                actual,
            } => write!(
                f,
                "list item {index} of type {} is not compatible with element type {element}",
                type_name(actual)
            ),
            Self::ExtensionNotRegistered(id) => {
                write!(f, "extension is not registered in this container: {id}")
            }
        }
    }
}

impl Error for ExpandoError {}

fn type_name(value: &Option<TypeTag>) -> String {
    value
        .as_ref()
        .map_or_else(|| "null".to_string(), ToString::to_string)
}
