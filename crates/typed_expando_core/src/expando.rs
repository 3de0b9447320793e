//! Public typed expando container.
//!
//! # Responsibility
//! - Wrap one `TypedSlotExtension` behind a name -> value mapping surface.
//! - Route every value read/write through the extension chain so type checks
//!   and change notification always apply.
//!
//! # Invariants
//! - Strict accessors report unresolved names as `UnknownProperty`.
//! - The mapping-style `remove` never fails; `remove_property` does.
//! - Iteration follows insertion order of the underlying store.

use crate::container::chain::{DynamicContainer, ExtensionHandle, StaticMembers};
use crate::container::descriptor::{PropertyDescriptor, PropertyHost};
use crate::container::notify::{ListenerId, PropertyChanged};
use crate::error::{ExpandoError, ExpandoResult};
use crate::extension::typed_slot::TypedSlotExtension;
use crate::model::type_tag::TypeTag;
use crate::model::value::Value;
use crate::schema::PropertySchema;

/// Object whose typed properties are declared at runtime.
#[derive(Debug)]
pub struct TypedExpando {
    chain: DynamicContainer,
    store: ExtensionHandle<TypedSlotExtension>,
}

impl StaticMembers for TypedExpando {
    // Everything on the expando is reached through methods; no member name is
    // reserved.
    fn static_member_names() -> &'static [&'static str] {
        &[]
    }
}

impl Default for TypedExpando {
    fn default() -> Self {
        Self::new()
    }
}

impl TypedExpando {
    /// Creates an expando without properties.
    pub fn new() -> Self {
        let mut chain = DynamicContainer::for_host::<Self>();
        let store = chain.add_extension(TypedSlotExtension::new());
        Self { chain, store }
    }

    /// Creates an expando declaring `properties` in order.
    ///
    /// Fails with `DuplicateProperty` on the first repeated name.
    pub fn with_properties<I, S>(properties: I) -> ExpandoResult<Self>
    where
        I: IntoIterator<Item = (S, TypeTag)>,
        S: Into<String>,
    {
        let mut expando = Self::new();
        for (name, property_type) in properties {
            expando.add_property(name, property_type)?;
        }
        Ok(expando)
    }

    /// Creates an expando from a declarative schema.
    pub fn from_schema(schema: &PropertySchema) -> ExpandoResult<Self> {
        Self::with_properties(schema.properties.iter().map(|declaration| {
            (
                declaration.name.as_str(),
                declaration.property_type.clone(),
            )
        }))
    }

    /// Declares a new property holding its type's default value.
    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        property_type: TypeTag,
    ) -> ExpandoResult<()> {
        self.store_mut()?.add_property(name, property_type)
    }

    /// Removes a property, failing with `UnknownProperty` when absent.
    pub fn remove_property(&mut self, name: &str) -> ExpandoResult<()> {
        self.store_mut()?.remove_property(name)
    }

    /// Removes a property; returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.remove_property(name).is_ok()
    }

    /// Declares a property typed after `value` and assigns it.
    ///
    /// `Null` declares the property as `any`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ExpandoResult<()> {
        let name = name.into();
        let value = value.into();
        self.add_property(name.as_str(), value.inferred_type())?;
        self.set(&name, value)
    }

    pub fn get(&self, name: &str) -> ExpandoResult<Value> {
        self.chain
            .try_get_property(name)
            .ok_or_else(|| ExpandoError::UnknownProperty(name.to_string()))
    }

    /// Assigns a value through the checked pipeline.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> ExpandoResult<()> {
        if self.chain.try_set_property(name, value.into())? {
            Ok(())
        } else {
            Err(ExpandoError::UnknownProperty(name.to_string()))
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.chain.resolve(name).is_some()
    }

    /// True when `name` exists and currently equals `value`.
    pub fn contains(&self, name: &str, value: &Value) -> bool {
        self.chain
            .try_get_property(name)
            .is_some_and(|current| current == *value)
    }

    pub fn property_type(&self, name: &str) -> Option<TypeTag> {
        self.chain
            .resolve(name)
            .map(|extension| extension.property_type(name))
    }

    pub fn len(&self) -> usize {
        self.store().map_or(0, TypedSlotExtension::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(name, value)` pairs in declaration order.
    ///
    /// Every call starts a fresh pass over the current properties.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.store()
            .ok()
            .into_iter()
            .flat_map(|store| store.iter().map(|(name, _)| name))
            .filter_map(move |name| {
                self.chain
                    .try_get_property(name)
                    .map(|value| (name, value))
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(name, _)| name)
    }

    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Registers a listener called after every observable change.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&PropertyChanged) + 'static,
    {
        self.chain.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.chain.unsubscribe(id)
    }

    /// Introspection table of the current properties.
    pub fn descriptors(&self) -> Vec<PropertyDescriptor> {
        self.chain.descriptors()
    }

    pub fn all_member_names(&self) -> Vec<String> {
        self.chain.all_member_names()
    }

    fn store(&self) -> ExpandoResult<&TypedSlotExtension> {
        self.chain.extension(self.store)
    }

    fn store_mut(&mut self) -> ExpandoResult<&mut TypedSlotExtension> {
        self.chain.extension_mut(self.store)
    }
}

impl PropertyHost for TypedExpando {
    fn try_get_property(&self, name: &str) -> Option<Value> {
        self.chain.try_get_property(name)
    }

    fn try_set_property(&mut self, name: &str, value: Value) -> ExpandoResult<bool> {
        self.chain.try_set_property(name, value)
    }
}

impl<'a> IntoIterator for &'a TypedExpando {
    type Item = (&'a str, Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
