//! Standard library built-in objects.
//!
//! Host-native implementations of the Object, Function, Array, String,
//! Number, Boolean, Math and JSON built-ins, registered by type name.

pub mod array;
pub mod boolean;
pub mod core;
pub mod function;
pub mod json;
pub mod math;
pub mod number;
pub mod object;
pub mod string;

pub use self::core::register_core_builtins;

use crate::runner::ds::operations::type_conversion::to_integer_or_infinity;
use crate::runner::ds::value::TracedValue;

/// The `idx`th argument, `undefined` when absent.
pub(crate) fn arg(args: &[TracedValue], idx: usize) -> TracedValue {
    args.get(idx).cloned().unwrap_or(TracedValue::Undefined)
}

/// Resolves a relative start/end argument (negative counts from the end)
/// against `len`. Missing arguments take `default`.
pub(crate) fn relative_index(value: Option<&TracedValue>, len: usize, default: usize) -> usize {
    match value {
        None | Some(TracedValue::Undefined) => default,
        Some(v) => {
            let n = to_integer_or_infinity(v);
            if n < 0.0 {
                (len as f64 + n).max(0.0) as usize
            } else {
                n.min(len as f64) as usize
            }
        }
    }
}
