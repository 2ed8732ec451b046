//! Built-in method registry.
//!
//! Method calls on arrays, strings and the other host types are looked up by
//! type and method name here instead of through a live prototype chain.
//! `std_lib` fills the registry; `method_aliases` in the configuration can add
//! further names for existing methods.

pub mod registry;
pub mod types;

pub use registry::{BuiltInRegistry, RegistryError};
pub use types::{BuiltInObject, EvalContext, NativeFn};
