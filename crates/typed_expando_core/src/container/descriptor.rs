//! Introspection table for embedding layers.
//!
//! # Responsibility
//! - Describe every dynamic member as `{name, type, read_only}` so a binding
//!   layer can present the container as an object with ordinary properties.
//! - Route descriptor reads and writes through the chain pipeline.
//!
//! # Invariants
//! - `set_value` never bypasses the type check or change notification.

use crate::container::chain::DynamicContainer;
use crate::error::ExpandoResult;
use crate::model::type_tag::TypeTag;
use crate::model::value::Value;
use serde::Serialize;

/// Read/write pipeline of an object exposing dynamic members.
///
/// Only the checked accessors are exposed; the extension chain behind them
/// stays private to the host.
pub trait PropertyHost {
    fn try_get_property(&self, name: &str) -> Option<Value>;
    fn try_set_property(&mut self, name: &str, value: Value) -> ExpandoResult<bool>;
}

impl PropertyHost for DynamicContainer {
    fn try_get_property(&self, name: &str) -> Option<Value> {
        DynamicContainer::try_get_property(self, name)
    }

    fn try_set_property(&mut self, name: &str, value: Value) -> ExpandoResult<bool> {
        DynamicContainer::try_set_property(self, name, value)
    }
}

/// Snapshot of one dynamic member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: TypeTag,
    pub read_only: bool,
}

impl PropertyDescriptor {
    /// Reads the member through `try_get_property`.
    pub fn get_value<H: PropertyHost + ?Sized>(&self, host: &H) -> Option<Value> {
        host.try_get_property(&self.name)
    }

    /// Writes the member through `try_set_property`.
    pub fn set_value<H: PropertyHost + ?Sized>(
        &self,
        host: &mut H,
        value: impl Into<Value>,
    ) -> ExpandoResult<bool> {
        host.try_set_property(&self.name, value.into())
    }
}
