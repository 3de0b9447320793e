//! Type and value model for dynamic properties.
//!
//! # Responsibility
//! - Define the declared-type vocabulary (`TypeTag`) and runtime values
//!   (`Value`) shared by extensions, the chain and the public container.
//!
//! # Invariants
//! - Type compatibility is decided only by `TypeTag::accepts`.

pub mod type_tag;
pub mod value;
