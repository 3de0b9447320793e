//! Property extension contracts.
//!
//! An extension is a self-contained provider of named, typed properties. The
//! extension chain resolves names to extensions and owns type checking and
//! change notification; extensions only store and hand out values.

pub mod contract;
pub mod typed_slot;
