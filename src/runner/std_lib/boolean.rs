//! Boolean built-in.

use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::{BuiltInObject, EvalContext};
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::type_conversion::to_boolean;
use crate::runner::ds::value::TracedValue;

/// Register the Boolean built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let boolean = BuiltInObject::new("Boolean")
        .with_constructor(boolean_constructor)
        .add_method("toString", boolean_to_string)
        .add_method("valueOf", boolean_value_of);

    registry.register_object(boolean);
}

fn boolean_constructor(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Boolean(
        args.first().map(to_boolean).unwrap_or(false),
    ))
}

fn boolean_to_string(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(to_boolean(&this).to_string()))
}

fn boolean_value_of(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Boolean(to_boolean(&this)))
}
