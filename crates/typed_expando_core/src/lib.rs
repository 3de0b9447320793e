//! Typed expando objects.
//! Properties are declared at runtime with an explicit type, resolved through
//! a chain of pluggable extensions, type-checked on write and observable
//! through change notification.

pub mod container;
pub mod error;
pub mod expando;
pub mod extension;
pub mod logging;
pub mod model;
pub mod schema;

pub use container::chain::{DynamicContainer, ExtensionHandle, StaticMembers};
pub use container::descriptor::{PropertyDescriptor, PropertyHost};
pub use container::notify::{ListenerId, PropertyChanged};
pub use error::{ExpandoError, ExpandoResult};
pub use expando::TypedExpando;
pub use extension::contract::PropertyExtension;
pub use extension::typed_slot::TypedSlotExtension;
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::type_tag::{TypeParseError, TypeTag, Typed};
pub use model::value::Value;
pub use schema::{PropertyDeclaration, PropertySchema, SchemaError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
