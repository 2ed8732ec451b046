//! Runtime data for traced values: the value type, binding environments,
//! evaluation errors and the operations the interpreter applies to values.

pub mod env;
pub mod error;
pub mod operations;
pub mod value;
