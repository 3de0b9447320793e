//! Dynamic container core.
//!
//! # Responsibility
//! - Chain property extensions behind one name-resolution policy.
//! - Own the checked write path and change notification.
//! - Export a descriptor table for introspection consumers.
//!
//! # See also
//! - `crate::extension` for the provider contract.

pub mod chain;
pub mod descriptor;
pub mod notify;
