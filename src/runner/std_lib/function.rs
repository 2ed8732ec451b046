//! Function built-in: `call` and `apply` on callables.

use super::arg;
use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::{BuiltInObject, EvalContext};
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::type_conversion::to_js_string;
use crate::runner::ds::value::TracedValue;

/// Register the Function built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let function = BuiltInObject::new("Function")
        .add_method("call", function_call)
        .add_method("apply", function_apply)
        .add_method("toString", function_to_string);

    registry.register_object(function);
}

/// Function.prototype.call
fn function_call(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let mut args = args.into_iter();
    let this_arg = args.next().unwrap_or(TracedValue::Undefined);
    ctx.call_function(&this, this_arg, args.collect())
}

/// Function.prototype.apply
fn function_apply(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let call_args = match arg(&args, 1) {
        TracedValue::Array(a) => a.borrow().clone(),
        TracedValue::Undefined | TracedValue::Null => Vec::new(),
        other => {
            return Err(EvalError::type_error(format!(
                "CreateListFromArrayLike called on non-object: {}",
                other
            )))
        }
    };
    ctx.call_function(&this, arg(&args, 0), call_args)
}

/// Function.prototype.toString
fn function_to_string(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(to_js_string(&this)))
}
