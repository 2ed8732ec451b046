//! Object built-in.
//!
//! Provides Object constructor, prototype methods and the `Object.keys`
//! family of static helpers.

use indexmap::IndexMap;

use super::arg;
use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::{BuiltInObject, EvalContext};
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::object::{get_property, set_property};
use crate::runner::ds::operations::type_conversion::{to_js_string, to_property_key};
use crate::runner::ds::value::TracedValue;

/// Register the Object built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let object = BuiltInObject::new("Object")
        .with_no_prototype()
        .with_constructor(object_constructor)
        .add_method("toString", object_to_string)
        .add_method("valueOf", object_value_of)
        .add_method("hasOwnProperty", object_has_own_property)
        .add_static_method("keys", object_keys)
        .add_static_method("values", object_values)
        .add_static_method("entries", object_entries)
        .add_static_method("assign", object_assign)
        .add_static_method("freeze", object_freeze);

    registry.register_object(object);
}

/// Own enumerable keys in insertion order.
fn own_keys(value: &TracedValue) -> Vec<String> {
    match value {
        TracedValue::Object(o) => o.borrow().properties.keys().cloned().collect(),
        TracedValue::Array(a) => (0..a.borrow().len()).map(|i| i.to_string()).collect(),
        TracedValue::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
        TracedValue::Function(f) => f.properties.borrow().keys().cloned().collect(),
        _ => Vec::new(),
    }
}

fn require_object_coercible(value: &TracedValue, method: &str) -> Result<(), EvalError> {
    if value.is_nullish() {
        Err(EvalError::type_error(format!(
            "Object.{} called on {}",
            method, value
        )))
    } else {
        Ok(())
    }
}

/// Object constructor.
fn object_constructor(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    match args.first() {
        None | Some(TracedValue::Null) | Some(TracedValue::Undefined) => {
            Ok(TracedValue::new_object(IndexMap::new()))
        }
        Some(v) => Ok(v.clone()),
    }
}

/// Object.prototype.toString
fn object_to_string(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(match this {
        TracedValue::Array(_) => "[object Array]".to_string(),
        TracedValue::Function(_) => "[object Function]".to_string(),
        TracedValue::Undefined => "[object Undefined]".to_string(),
        TracedValue::Null => "[object Null]".to_string(),
        TracedValue::Object(_) | TracedValue::ScopeRef(_) => "[object Object]".to_string(),
        other => to_js_string(&other),
    }))
}

/// Object.prototype.valueOf
fn object_value_of(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(this)
}

/// Object.prototype.hasOwnProperty
fn object_has_own_property(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let key = to_property_key(&arg(&args, 0));
    let has = match &this {
        TracedValue::Object(o) => o.borrow().properties.contains_key(&key),
        TracedValue::Array(a) => {
            key == "length" || key.parse::<usize>().map_or(false, |i| i < a.borrow().len())
        }
        TracedValue::Function(f) => f.get_own_property(&key).is_some(),
        _ => false,
    };
    Ok(TracedValue::Boolean(has))
}

/// Object.keys
fn object_keys(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let target = arg(&args, 0);
    require_object_coercible(&target, "keys")?;
    Ok(TracedValue::new_array(
        own_keys(&target).into_iter().map(TracedValue::String).collect(),
    ))
}

/// Object.values
fn object_values(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let target = arg(&args, 0);
    require_object_coercible(&target, "values")?;
    let values = own_keys(&target)
        .iter()
        .map(|k| get_property(&target, k))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TracedValue::new_array(values))
}

/// Object.entries
fn object_entries(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let target = arg(&args, 0);
    require_object_coercible(&target, "entries")?;
    let mut entries = Vec::new();
    for key in own_keys(&target) {
        let value = get_property(&target, &key)?;
        entries.push(TracedValue::new_array(vec![TracedValue::String(key), value]));
    }
    Ok(TracedValue::new_array(entries))
}

/// Object.assign
fn object_assign(
    ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let target = arg(&args, 0);
    require_object_coercible(&target, "assign")?;
    for source in args.iter().skip(1) {
        for key in own_keys(source) {
            let value = get_property(source, &key)?;
            set_property(&target, &key, value, ctx.max_array_growth)?;
        }
    }
    Ok(target)
}

/// Object.freeze. Values are not write-protected; the argument is returned.
fn object_freeze(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(arg(&args, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_keep_insertion_order() {
        let mut props = IndexMap::new();
        props.insert("b".to_string(), TracedValue::from(1));
        props.insert("a".to_string(), TracedValue::from(2));
        let obj = TracedValue::new_object(props);
        let mut ctx = EvalContext::with_core();
        let keys = object_keys(&mut ctx, TracedValue::Undefined, vec![obj.clone()]).unwrap();
        assert_eq!(keys, TracedValue::new_array(vec!["b".into(), "a".into()]));
        let entries = object_entries(&mut ctx, TracedValue::Undefined, vec![obj]).unwrap();
        assert_eq!(
            entries.to_string(),
            "[ [ 'b', 1 ], [ 'a', 2 ] ]"
        );
    }

    #[test]
    fn assign_copies_into_target() {
        let target = TracedValue::new_object(IndexMap::new());
        let mut props = IndexMap::new();
        props.insert("x".to_string(), TracedValue::from(1));
        let source = TracedValue::new_object(props);
        let mut ctx = EvalContext::with_core();
        let result =
            object_assign(&mut ctx, TracedValue::Undefined, vec![target.clone(), source]).unwrap();
        assert!(result.same_identity(&target));
        assert_eq!(get_property(&target, "x").unwrap(), 1.into());
    }
}
