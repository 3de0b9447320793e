//! Extension chain: name resolution, checked writes and change notification.
//!
//! # Responsibility
//! - Resolve a property name to at most one registered extension.
//! - Proxy reads and writes through the resolved extension.
//! - Enforce type compatibility before any write reaches an extension.
//! - Notify listeners after a committed write changed an observable value.
//!
//! # Invariants
//! - A strong name is never resolved, whatever extensions declare.
//! - Extensions are searched newest-first, so later registrations shadow
//!   earlier ones.
//! - A rejected write leaves every extension and every listener untouched.
//! - Listeners never run before the value is committed.

use crate::container::descriptor::PropertyDescriptor;
use crate::container::notify::{ListenerId, ListenerRegistry, PropertyChanged};
use crate::error::{ExpandoError, ExpandoResult};
use crate::extension::contract::PropertyExtension;
use crate::model::value::Value;
use indexmap::IndexSet;
use log::{debug, trace, warn};
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use uuid::Uuid;

/// Host types whose statically known member names must never be shadowed by a
/// dynamic property.
pub trait StaticMembers {
    fn static_member_names() -> &'static [&'static str];
}

/// Typed handle to an extension registered in one chain.
pub struct ExtensionHandle<T> {
    id: Uuid,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ExtensionHandle<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl<T> Clone for ExtensionHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ExtensionHandle<T> {}

impl<T> Debug for ExtensionHandle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ExtensionHandle").field(&self.id).finish()
    }
}

trait ErasedExtension: PropertyExtension {
    fn as_extension(&self) -> &dyn PropertyExtension;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: PropertyExtension + 'static> ErasedExtension for T {
    fn as_extension(&self) -> &dyn PropertyExtension {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

struct RegisteredExtension {
    id: Uuid,
    extension: Box<dyn ErasedExtension>,
}

/// Ordered extension chain plus the host's reserved strong names.
#[derive(Default)]
pub struct DynamicContainer {
    strong_names: IndexSet<String>,
    extensions: Vec<RegisteredExtension>,
    listeners: ListenerRegistry,
}

impl DynamicContainer {
    /// Creates a chain with no strong names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain reserving the given strong names.
    pub fn with_strong_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strong_names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Creates a chain reserving the static members of host `H`.
    pub fn for_host<H: StaticMembers>() -> Self {
        Self::with_strong_names(H::static_member_names().iter().copied())
    }

    /// Appends an extension; it shadows every extension registered before it.
    pub fn add_extension<T: PropertyExtension + 'static>(
        &mut self,
        extension: T,
    ) -> ExtensionHandle<T> {
        let id = Uuid::new_v4();
        debug!(
            "event=extension_register module=chain status=ok id={} position={}",
            id,
            self.extensions.len()
        );
        self.extensions.push(RegisteredExtension {
            id,
            extension: Box::new(extension),
        });
        ExtensionHandle {
            id,
            _marker: PhantomData,
        }
    }

    /// Detaches an extension and hands it back.
    pub fn remove_extension<T: PropertyExtension + 'static>(
        &mut self,
        handle: ExtensionHandle<T>,
    ) -> ExpandoResult<T> {
        let position = self
            .position_of::<T>(handle.id)
            .ok_or(ExpandoError::ExtensionNotRegistered(handle.id))?;
        let registered = self.extensions.remove(position);
        debug!(
            "event=extension_remove module=chain status=ok id={}",
            handle.id
        );
        registered
            .extension
            .into_any()
            .downcast::<T>()
            .map(|extension| *extension)
            .map_err(|_| ExpandoError::ExtensionNotRegistered(handle.id))
    }

    pub fn extension<T: PropertyExtension + 'static>(
        &self,
        handle: ExtensionHandle<T>,
    ) -> ExpandoResult<&T> {
        self.extensions
            .iter()
            .find(|registered| registered.id == handle.id)
            .and_then(|registered| registered.extension.as_any().downcast_ref::<T>())
            .ok_or(ExpandoError::ExtensionNotRegistered(handle.id))
    }

    /// Mutable access for schema management (adding/removing members).
    ///
    /// Writes of property values must go through `try_set_property` instead.
    pub fn extension_mut<T: PropertyExtension + 'static>(
        &mut self,
        handle: ExtensionHandle<T>,
    ) -> ExpandoResult<&mut T> {
        self.extensions
            .iter_mut()
            .find(|registered| registered.id == handle.id)
            .and_then(|registered| registered.extension.as_any_mut().downcast_mut::<T>())
            .ok_or(ExpandoError::ExtensionNotRegistered(handle.id))
    }

    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_strong(&self, name: &str) -> bool {
        self.strong_names.contains(name)
    }

    pub fn strong_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.strong_names.iter().map(String::as_str)
    }

    /// Resolves `name` to the extension responsible for it.
    pub fn resolve(&self, name: &str) -> Option<&dyn PropertyExtension> {
        self.resolve_position(name)
            .map(|position| self.extensions[position].extension.as_extension())
    }

    /// Reads a dynamic property.
    ///
    /// Returns `None` when no extension resolves the name or when the resolved
    /// member is not readable.
    pub fn try_get_property(&self, name: &str) -> Option<Value> {
        let extension = self.resolve(name)?;
        if !extension.can_read(name) {
            return None;
        }
        Some(extension.get(name))
    }

    /// Writes a dynamic property through the checked pipeline.
    ///
    /// Returns `Ok(false)` when the name is unresolved or not writable and
    /// `Err(TypeMismatch)` when `value` is not assignable to the declared type.
    pub fn try_set_property(&mut self, name: &str, value: Value) -> ExpandoResult<bool> {
        let Some(position) = self.resolve_position(name) else {
            return Ok(false);
        };
        let has_listeners = !self.listeners.is_empty();
        let extension = &mut self.extensions[position].extension;
        if !extension.can_write(name) {
            return Ok(false);
        }

        let should_notify =
            has_listeners && extension.can_read(name) && extension.get(name) != value;

        let expected = extension.property_type(name);
        if !expected.accepts(&value) {
            let actual = value.runtime_type();
            warn!(
                "event=property_set module=chain status=rejected reason=type_mismatch name={} expected={} actual={}",
                name,
                expected,
                actual
                    .as_ref()
                    .map_or_else(|| "null".to_string(), ToString::to_string)
            );
            return Err(ExpandoError::TypeMismatch {
                property: name.to_string(),
                expected,
                actual,
            });
        }

        extension.set(name, value);
        trace!(
            "event=property_set module=chain status=ok name={} notify={}",
            name,
            should_notify
        );

        if should_notify {
            self.listeners.notify(name);
        }
        Ok(true)
    }

    /// Strong names in declaration order, then every extension's members,
    /// deduplicated in first-seen order.
    pub fn all_member_names(&self) -> Vec<String> {
        self.strong_names
            .iter()
            .map(String::as_str)
            .chain(self.dynamic_member_names())
            .collect::<IndexSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Descriptor snapshot of every resolvable dynamic member.
    pub fn descriptors(&self) -> Vec<PropertyDescriptor> {
        self.dynamic_member_names()
            .collect::<IndexSet<&str>>()
            .into_iter()
            .filter_map(|name| self.descriptor(name))
            .collect()
    }

    /// Descriptor for one member, `None` if the chain does not resolve it.
    pub fn descriptor(&self, name: &str) -> Option<PropertyDescriptor> {
        let extension = self.resolve(name)?;
        Some(PropertyDescriptor {
            name: name.to_string(),
            property_type: extension.property_type(name),
            read_only: !extension.can_write(name),
        })
    }

    /// Registers a change listener.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&PropertyChanged) + 'static,
    {
        self.listeners.subscribe(Box::new(listener))
    }

    /// Removes a listener; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn resolve_position(&self, name: &str) -> Option<usize> {
        if self.strong_names.contains(name) {
            return None;
        }
        self.extensions
            .iter()
            .rposition(|registered| registered.extension.has_member(name))
    }

    fn position_of<T: 'static>(&self, id: Uuid) -> Option<usize> {
        self.extensions.iter().position(|registered| {
            registered.id == id && registered.extension.as_any().is::<T>()
        })
    }

    fn dynamic_member_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.extensions
            .iter()
            .flat_map(|registered| registered.extension.member_names())
    }
}

impl Debug for DynamicContainer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicContainer")
            .field("strong_names", &self.strong_names)
            .field("extensions", &self.extensions.len())
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{DynamicContainer, StaticMembers};
    use crate::container::notify::PropertyChanged;
    use crate::error::ExpandoError;
    use crate::extension::contract::PropertyExtension;
    use crate::extension::typed_slot::TypedSlotExtension;
    use crate::model::type_tag::TypeTag;
    use crate::model::value::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Single-member extension with configurable access flags.
    struct FlagExtension {
        name: &'static str,
        readable: bool,
        writable: bool,
        value: Value,
    }

    impl FlagExtension {
        fn new(name: &'static str, readable: bool, writable: bool) -> Self {
            Self {
                name,
                readable,
                writable,
                value: Value::Int(7),
            }
        }
    }

    impl PropertyExtension for FlagExtension {
        fn member_names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
            Box::new(std::iter::once(self.name))
        }

        fn can_read(&self, _name: &str) -> bool {
            self.readable
        }

        fn can_write(&self, _name: &str) -> bool {
            self.writable
        }

        fn get(&self, _name: &str) -> Value {
            self.value.clone()
        }

        fn set(&mut self, _name: &str, value: Value) {
            self.value = value;
        }

        fn property_type(&self, _name: &str) -> TypeTag {
            TypeTag::Int
        }
    }

    struct Host;

    impl StaticMembers for Host {
        fn static_member_names() -> &'static [&'static str] {
            &["Id", "Kind"]
        }
    }

    fn store_with(properties: &[(&str, TypeTag)]) -> TypedSlotExtension {
        let mut store = TypedSlotExtension::new();
        for (name, property_type) in properties {
            store
                .add_property(*name, property_type.clone())
                .expect("fixture property");
        }
        store
    }

    fn recorder(chain: &mut DynamicContainer) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        chain.subscribe(move |event: &PropertyChanged| {
            sink.borrow_mut().push(event.property_name.clone());
        });
        seen
    }

    #[test]
    fn strong_names_are_never_resolved() {
        let mut chain = DynamicContainer::for_host::<Host>();
        chain.add_extension(store_with(&[("Id", TypeTag::Int), ("Age", TypeTag::Int)]));

        assert!(chain.is_strong("Id"));
        assert!(chain.resolve("Id").is_none());
        assert_eq!(chain.try_get_property("Id"), None);
        assert!(!chain
            .try_set_property("Id", Value::Int(3))
            .expect("unresolved write is not an error"));
        assert!(chain.resolve("Age").is_some());
    }

    #[test]
    fn later_extension_shadows_earlier_for_read_and_write() {
        let mut chain = DynamicContainer::new();
        let base = chain.add_extension(store_with(&[("Age", TypeTag::Int)]));
        let overlay = chain.add_extension(store_with(&[("Age", TypeTag::Long)]));

        assert_eq!(chain.try_get_property("Age"), Some(Value::Long(0)));
        let err = chain
            .try_set_property("Age", Value::Int(5))
            .expect_err("overlay declares long");
        assert!(matches!(err, ExpandoError::TypeMismatch { .. }));

        assert!(chain
            .try_set_property("Age", Value::Long(5))
            .expect("long write"));
        assert_eq!(
            chain.extension(overlay).expect("overlay").get("Age"),
            Value::Long(5)
        );
        assert_eq!(
            chain.extension(base).expect("base").get("Age"),
            Value::Int(0)
        );
    }

    #[test]
    fn removing_overlay_uncovers_base() {
        let mut chain = DynamicContainer::new();
        chain.add_extension(store_with(&[("Age", TypeTag::Int)]));
        let overlay = chain.add_extension(store_with(&[("Age", TypeTag::Text)]));

        let removed = chain.remove_extension(overlay).expect("overlay removal");
        assert!(removed.contains("Age"));
        assert_eq!(chain.extension_count(), 1);
        assert_eq!(chain.try_get_property("Age"), Some(Value::Int(0)));
        assert_eq!(
            chain.remove_extension(overlay).map(|_| ()),
            Err(ExpandoError::ExtensionNotRegistered(overlay.id()))
        );
    }

    #[test]
    fn unreadable_member_reads_as_absent() {
        let mut chain = DynamicContainer::new();
        chain.add_extension(FlagExtension::new("Secret", false, true));

        assert!(chain.resolve("Secret").is_some());
        assert_eq!(chain.try_get_property("Secret"), None);
    }

    #[test]
    fn unwritable_member_rejects_write_without_error() {
        let mut chain = DynamicContainer::new();
        let handle = chain.add_extension(FlagExtension::new("Fixed", true, false));
        let seen = recorder(&mut chain);

        let written = chain
            .try_set_property("Fixed", Value::from("not even an int"))
            .expect("read-only write is not an error");
        assert!(!written);
        assert_eq!(chain.extension(handle).expect("handle").value, Value::Int(7));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn unreadable_member_is_written_without_notification() {
        let mut chain = DynamicContainer::new();
        let handle = chain.add_extension(FlagExtension::new("Sink", false, true));
        let seen = recorder(&mut chain);

        assert!(chain
            .try_set_property("Sink", Value::Int(99))
            .expect("write-only member accepts ints"));
        assert_eq!(chain.extension(handle).expect("handle").value, Value::Int(99));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn type_mismatch_neither_mutates_nor_notifies() {
        let mut chain = DynamicContainer::new();
        chain.add_extension(store_with(&[("Age", TypeTag::Int)]));
        let seen = recorder(&mut chain);

        let err = chain
            .try_set_property("Age", Value::from("Hello"))
            .expect_err("text into int must fail");
        assert_eq!(
            err,
            ExpandoError::TypeMismatch {
                property: "Age".to_string(),
                expected: TypeTag::Int,
                actual: Some(TypeTag::Text),
            }
        );
        assert_eq!(chain.try_get_property("Age"), Some(Value::Int(0)));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn notifies_once_per_observable_change() {
        let mut chain = DynamicContainer::new();
        chain.add_extension(store_with(&[("Age", TypeTag::Int)]));
        let seen = recorder(&mut chain);

        chain.try_set_property("Age", Value::Int(0)).expect("same value");
        chain.try_set_property("Age", Value::Int(1)).expect("new value");
        chain.try_set_property("Age", Value::Int(1)).expect("same value");

        assert_eq!(*seen.borrow(), vec!["Age".to_string()]);
    }

    #[test]
    fn listener_observes_committed_value() {
        let mut chain = DynamicContainer::new();
        let handle = chain.add_extension(store_with(&[("Age", TypeTag::Int)]));
        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        chain.subscribe(move |_: &PropertyChanged| *counter.borrow_mut() += 1);

        chain.try_set_property("Age", Value::Int(4)).expect("write");
        assert_eq!(*fired.borrow(), 1);
        assert_eq!(chain.extension(handle).expect("handle").get("Age"), Value::Int(4));
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let mut chain = DynamicContainer::new();
        chain.add_extension(store_with(&[("Age", TypeTag::Int)]));
        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        let id = chain.subscribe(move |_: &PropertyChanged| *counter.borrow_mut() += 1);

        assert!(chain.unsubscribe(id));
        chain.try_set_property("Age", Value::Int(4)).expect("write");
        assert_eq!(*fired.borrow(), 0);
        assert_eq!(chain.listener_count(), 0);
    }

    #[test]
    fn all_member_names_lists_strong_then_dynamic_once() {
        let mut chain = DynamicContainer::for_host::<Host>();
        chain.add_extension(store_with(&[("Name", TypeTag::Text), ("Id", TypeTag::Int)]));
        chain.add_extension(store_with(&[("Age", TypeTag::Int), ("Name", TypeTag::Text)]));

        assert_eq!(
            chain.all_member_names(),
            vec!["Id", "Kind", "Name", "Age"]
        );
    }

    #[test]
    fn descriptors_skip_strong_names_and_report_access() {
        let mut chain = DynamicContainer::for_host::<Host>();
        chain.add_extension(store_with(&[("Id", TypeTag::Int), ("Age", TypeTag::Int)]));
        chain.add_extension(FlagExtension::new("Fixed", true, false));

        let descriptors = chain.descriptors();
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Age", "Fixed"]);
        assert!(!descriptors[0].read_only);
        assert!(descriptors[1].read_only);
        assert_eq!(descriptors[1].property_type, TypeTag::Int);
    }

    #[test]
    fn strong_names_keep_declaration_order() {
        let mut chain = DynamicContainer::with_strong_names(["Kind", "Id", "Kind"]);
        chain.add_extension(store_with(&[("Age", TypeTag::Int), ("Id", TypeTag::Int)]));

        assert_eq!(chain.strong_names().collect::<Vec<_>>(), vec!["Kind", "Id"]);
        assert_eq!(chain.all_member_names(), vec!["Kind", "Id", "Age"]);
    }
}
