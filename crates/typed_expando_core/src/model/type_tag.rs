//! Declared property types.
//!
//! # Responsibility
//! - Define the closed vocabulary of types a property can be declared with.
//! - Decide assignability of runtime values, including nullability rules.
//! - Parse and format the text form used by schemas and the CLI.
//!
//! # Invariants
//! - `Nullable` only ever wraps a value-like type.
//! - A value-like type that is not `Nullable` never accepts `Null`.
//! - Text form round-trips: `tag.to_string().parse() == Ok(tag.normalized())`.
//! - A list value is accepted only when every item fits both the list's own
//!   element type and the declared element type.

use crate::model::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

static LIST_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^list\s*<\s*(.+?)\s*>$").expect("valid list type regex"));

/// Declared type of one dynamic property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeTag {
    /// Universal reference type; accepts every value including `Null`.
    Any,
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 64-bit float.
    Float,
    Text,
    Uuid,
    /// Homogeneous typed list.
    List(Box<TypeTag>),
    /// Value-like type that additionally accepts `Null`.
    Nullable(Box<TypeTag>),
}

impl TypeTag {
    /// Builds a typed list tag.
    pub fn list(element: TypeTag) -> Self {
        Self::List(Box::new(element))
    }

    /// Builds a nullable tag.
    ///
    /// Reference types already accept `Null`, so they are returned unchanged,
    /// as is a type that is already nullable.
    pub fn nullable(inner: TypeTag) -> Self {
        if inner.accepts_null() {
            inner
        } else {
            Self::Nullable(Box::new(inner))
        }
    }

    /// Rebuilds a tag so `Nullable` wraps value-like types only.
    ///
    /// Tags assembled from the public variants may carry `Nullable(text)` or
    /// `Nullable(int?)`; both collapse the same way `nullable` does.
    pub fn normalized(&self) -> Self {
        match self {
            Self::List(element) => Self::list(element.normalized()),
            Self::Nullable(inner) => Self::nullable(inner.normalized()),
            other => other.clone(),
        }
    }

    /// Returns the tag for a Rust type with a fixed mapping.
    pub fn of<T: Typed>() -> Self {
        T::type_tag()
    }

    /// Whether values of this type are stored inline (numbers, flags, ids).
    ///
    /// `Nullable` of a value-like type counts as value-like; it is the
    /// nullability flag that lets it accept `Null`.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::Long | Self::Float | Self::Uuid
        ) || matches!(self, Self::Nullable(inner) if inner.is_value_type())
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// `Null` is legal for nullable and reference types only.
    pub fn accepts_null(&self) -> bool {
        self.is_nullable() || !self.is_value_type()
    }

    /// Value a freshly registered property starts with.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Long => Value::Long(0),
            Self::Float => Value::Float(0.0),
            Self::Uuid => Value::Uuid(Uuid::nil()),
            Self::Any | Self::Text | Self::List(_) | Self::Nullable(_) => Value::Null,
        }
    }

    /// Returns whether a value whose runtime type is `source` can be stored in a
    /// property declared as `self`.
    pub fn is_assignable_from(&self, source: &TypeTag) -> bool {
        if self == source {
            return true;
        }
        match self {
            Self::Any => true,
            Self::Nullable(inner) => inner.is_assignable_from(source),
            // Lists are covariant over reference element types only.
            Self::List(target) => match source {
                Self::List(element) => {
                    !element.is_value_type() && target.is_assignable_from(element)
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Type compatibility check applied before every write.
    pub fn accepts(&self, value: &Value) -> bool {
        match value.runtime_type() {
            None => self.accepts_null(),
            Some(source) => self.is_assignable_from(&source) && self.accepts_items(value),
        }
    }

    fn accepts_items(&self, value: &Value) -> bool {
        let Value::List { element, items } = value else {
            return true;
        };
        match self {
            Self::List(declared) => items
                .iter()
                .all(|item| element.accepts(item) && declared.accepts(item)),
            _ => items.iter().all(|item| element.accepts(item)),
        }
    }

    /// Parses raw text into a value of this type.
    ///
    /// `null` (any case) yields `Null` when the type accepts it. List items are
    /// comma separated; an empty string is an empty list.
    pub fn parse_value(&self, raw: &str) -> Result<Value, TypeParseError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("null") && self.accepts_null() {
            return Ok(Value::Null);
        }
        let invalid = || TypeParseError::InvalidValue {
            expected: self.clone(),
            raw: raw.to_string(),
        };
        match self {
            Self::Any | Self::Text => Ok(Value::Text(raw.to_string())),
            Self::Bool => trimmed.parse().map(Value::Bool).map_err(|_| invalid()),
            Self::Int => trimmed.parse().map(Value::Int).map_err(|_| invalid()),
            Self::Long => trimmed.parse().map(Value::Long).map_err(|_| invalid()),
            Self::Float => trimmed.parse().map(Value::Float).map_err(|_| invalid()),
            Self::Uuid => Uuid::parse_str(trimmed)
                .map(Value::Uuid)
                .map_err(|_| invalid()),
            Self::Nullable(inner) => inner.parse_value(raw),
            Self::List(element) => {
                let items = if trimmed.is_empty() {
                    Vec::new()
                } else {
                    trimmed
                        .split(',')
                        .map(|item| element.parse_value(item.trim()))
                        .collect::<Result<Vec<_>, _>>()?
                };
                Value::list(element.as_ref().clone(), items).map_err(|_| invalid())
            }
        }
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Text => write!(f, "text"),
            Self::Uuid => write!(f, "uuid"),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Nullable(inner) if inner.accepts_null() => write!(f, "{inner}"),
            Self::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

impl FromStr for TypeTag {
    type Err = TypeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        if normalized.is_empty() {
            return Err(TypeParseError::EmptyType);
        }
        if let Some(inner) = normalized.strip_suffix('?') {
            return Ok(Self::nullable(inner.parse()?));
        }
        if let Some(captures) = LIST_TYPE_RE.captures(normalized) {
            return Ok(Self::list(captures[1].parse()?));
        }
        match normalized {
            "any" => Ok(Self::Any),
            "bool" => Ok(Self::Bool),
            "int" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "float" => Ok(Self::Float),
            "text" => Ok(Self::Text),
            "uuid" => Ok(Self::Uuid),
            other => Err(TypeParseError::UnknownType(other.to_string())),
        }
    }
}

impl TryFrom<String> for TypeTag {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeTag> for String {
    fn from(value: TypeTag) -> Self {
        value.to_string()
    }
}

/// Rust types with a fixed declared-type mapping.
pub trait Typed {
    fn type_tag() -> TypeTag;
}

impl Typed for bool {
    fn type_tag() -> TypeTag {
        TypeTag::Bool
    }
}

impl Typed for i32 {
    fn type_tag() -> TypeTag {
        TypeTag::Int
    }
}

impl Typed for i64 {
    fn type_tag() -> TypeTag {
        TypeTag::Long
    }
}

impl Typed for f64 {
    fn type_tag() -> TypeTag {
        TypeTag::Float
    }
}

impl Typed for String {
    fn type_tag() -> TypeTag {
        TypeTag::Text
    }
}

impl Typed for Uuid {
    fn type_tag() -> TypeTag {
        TypeTag::Uuid
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::list(T::type_tag())
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::nullable(T::type_tag())
    }
}

/// Type text and raw value parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    EmptyType,
    UnknownType(String),
    InvalidValue { expected: TypeTag, raw: String },
}

impl Display for TypeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyType => write!(f, "type name must not be empty"),
            Self::UnknownType(value) => write!(
                f,
                "type name is unsupported: {value} (expected any|bool|int|long|float|text|uuid|list<T>|T?)"
            ),
            Self::InvalidValue { expected, raw } => {
                write!(f, "value `{raw}` cannot be read as {expected}")
            }
        }
    }
}

impl Error for TypeParseError {}
