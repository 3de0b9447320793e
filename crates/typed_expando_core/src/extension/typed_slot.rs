//! In-memory typed-slot extension.
//!
//! # Responsibility
//! - Store an insertion-ordered set of `(name, declared type, value)` slots.
//! - Back the properties of `TypedExpando`.
//!
//! # Invariants
//! - Names are unique.
//! - A slot starts at its declared type's default value.
//! - Declared types are stored normalized.
//! - Removal keeps the relative order of the remaining slots.

use crate::error::{ExpandoError, ExpandoResult};
use crate::extension::contract::PropertyExtension;
use crate::model::type_tag::TypeTag;
use crate::model::value::Value;
use log::{debug, warn};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    property_type: TypeTag,
    value: Value,
}

/// Name -> typed slot store. Every slot is readable and writable.
#[derive(Debug, Default)]
pub struct TypedSlotExtension {
    // IndexMap keeps declaration order for iteration and member listing.
    slots: IndexMap<String, Slot>,
}

impl TypedSlotExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property initialized to the type's default value.
    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        property_type: TypeTag,
    ) -> ExpandoResult<()> {
        let name = name.into();
        if self.slots.contains_key(name.as_str()) {
            return Err(ExpandoError::DuplicateProperty(name));
        }

        let property_type = property_type.normalized();
        debug!(
            "event=property_add module=typed_slot status=ok name={} type={}",
            name, property_type
        );
        self.slots.insert(
            name,
            Slot {
                value: property_type.default_value(),
                property_type,
            },
        );
        Ok(())
    }

    /// Unregisters a property.
    pub fn remove_property(&mut self, name: &str) -> ExpandoResult<()> {
        if self.slots.shift_remove(name).is_none() {
            return Err(ExpandoError::UnknownProperty(name.to_string()));
        }
        debug!(
            "event=property_remove module=typed_slot status=ok name={}",
            name
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.slots
            .iter()
            .map(|(name, slot)| (name.as_str(), &slot.value))
    }
}

impl PropertyExtension for TypedSlotExtension {
    fn member_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.slots.keys().map(String::as_str))
    }

    fn has_member(&self, name: &str) -> bool {
        self.contains(name)
    }

    fn can_read(&self, _name: &str) -> bool {
        true
    }

    fn can_write(&self, _name: &str) -> bool {
        true
    }

    fn get(&self, name: &str) -> Value {
        match self.slots.get(name) {
            Some(slot) => slot.value.clone(),
            None => {
                warn!(
                    "event=property_get module=typed_slot status=error reason=not_a_member name={}",
                    name
                );
                Value::Null
            }
        }
    }

    fn set(&mut self, name: &str, value: Value) {
        match self.slots.get_mut(name) {
            Some(slot) => slot.value = value,
            None => warn!(
                "event=property_set module=typed_slot status=error reason=not_a_member name={}",
                name
            ),
        }
    }

    fn property_type(&self, name: &str) -> TypeTag {
        self.slots
            .get(name)
            .map_or(TypeTag::Any, |slot| slot.property_type.clone())
    }
}
