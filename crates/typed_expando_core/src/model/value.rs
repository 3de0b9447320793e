//! Runtime property values.
//!
//! # Invariants
//! - Every item of a list built by `Value::list` is accepted by the list's
//!   element type. Hand-built lists are rechecked item by item on write.
//! - Equality is value equality; `NaN` equals `NaN` so rewriting it is not a
//!   change.

use crate::error::{ExpandoError, ExpandoResult};
use crate::model::type_tag::{TypeTag, Typed};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Dynamically typed property value.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    /// Typed list; build through [`Value::list`] so items are checked.
    List { element: TypeTag, items: Vec<Value> },
}

impl Value {
    /// Builds a typed list after checking every item against `element`.
    pub fn list(element: TypeTag, items: Vec<Value>) -> ExpandoResult<Self> {
        let element = element.normalized();
        if let Some((index, item)) = items
            .iter()
            .enumerate()
            .find(|(_, item)| !element.accepts(item))
        {
            return Err(ExpandoError::InvalidListItem {
                element,
                index,
                actual: item.runtime_type(),
            });
        }
        Ok(Self::List { element, items })
    }

    /// Runtime type of this value, `None` for `Null`.
    pub fn runtime_type(&self) -> Option<TypeTag> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(TypeTag::Bool),
            Self::Int(_) => Some(TypeTag::Int),
            Self::Long(_) => Some(TypeTag::Long),
            Self::Float(_) => Some(TypeTag::Float),
            Self::Text(_) => Some(TypeTag::Text),
            Self::Uuid(_) => Some(TypeTag::Uuid),
            Self::List { element, .. } => Some(TypeTag::list(element.clone())),
        }
    }

    /// Declared type inferred for an untyped `add`; `Null` infers `Any`.
    pub fn inferred_type(&self) -> TypeTag {
        self.runtime_type().unwrap_or(TypeTag::Any)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer view widening `Int` to `i64`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(i64::from(*value)),
            Self::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List { items, .. } => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (
                Self::List {
                    element: a_element,
                    items: a_items,
                },
                Self::List {
                    element: b_element,
                    items: b_items,
                },
            ) => a_element == b_element && a_items == b_items,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Long(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
            Self::Uuid(value) => write!(f, "{value}"),
            Self::List { items, .. } => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Typed + Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        // Items of a `Typed` element type are always accepted, no check needed.
        Self::List {
            element: T::type_tag(),
            items: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::error::ExpandoError;
    use crate::model::type_tag::TypeTag;

    #[test]
    fn runtime_type_matches_variant() {
        assert_eq!(Value::Null.runtime_type(), None);
        assert_eq!(Value::from(5).runtime_type(), Some(TypeTag::Int));
        assert_eq!(Value::from(5_i64).runtime_type(), Some(TypeTag::Long));
        assert_eq!(
            Value::from(vec![true, false]).runtime_type(),
            Some(TypeTag::list(TypeTag::Bool))
        );
    }

    #[test]
    fn inferred_type_of_null_is_any() {
        assert_eq!(Value::Null.inferred_type(), TypeTag::Any);
        assert_eq!(Value::from("x").inferred_type(), TypeTag::Text);
    }

    #[test]
    fn list_rejects_foreign_items() {
        let err = Value::list(TypeTag::Int, vec![Value::Int(1), Value::from("two")])
            .expect_err("text item must be rejected");
        assert_eq!(
            err,
            ExpandoError::InvalidListItem {
                element: TypeTag::Int,
                index: 1,
                actual: Some(TypeTag::Text),
            }
        );

        let err = Value::list(TypeTag::Int, vec![Value::Null]).expect_err("null item");
        assert!(matches!(err, ExpandoError::InvalidListItem { index: 0, .. }));

        Value::list(TypeTag::nullable(TypeTag::Int), vec![Value::Null, Value::Int(2)])
            .expect("nullable items accept null");
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(Value::from("Rafa"), Value::from("Rafa".to_string()));
        assert_ne!(Value::Int(1), Value::Long(1));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(20)), Value::Int(20));
    }

    #[test]
    fn displays_compact_form() {
        assert_eq!(Value::from(vec![1_i32, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::from("a").to_string(), "\"a\"");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
