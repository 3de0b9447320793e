//! Capability contract shared by every property provider.

use crate::model::type_tag::TypeTag;
use crate::model::value::Value;

/// Provider of zero or more named, typed properties.
///
/// Every method except `member_names`/`has_member` takes a name the caller has
/// already resolved to this extension. Implementations may assume that and are
/// not required to re-check membership.
pub trait PropertyExtension {
    /// Live view of the names this extension currently owns.
    fn member_names(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Membership test used by name resolution.
    fn has_member(&self, name: &str) -> bool {
        self.member_names().any(|member| member == name)
    }

    fn can_read(&self, name: &str) -> bool;

    fn can_write(&self, name: &str) -> bool;

    /// Raw read.
    fn get(&self, name: &str) -> Value;

    /// Raw write. No type check; the chain validates before calling this.
    fn set(&mut self, name: &str, value: Value);

    /// Declared type used for compatibility checks and introspection.
    fn property_type(&self, name: &str) -> TypeTag;
}
