//! Array built-in.
//!
//! Provides Array constructor and prototype methods. In-place methods
//! (`push`, `splice`, `reverse`, `sort`, ...) mutate the shared array handle,
//! so every binding aliasing the receiver observes the change.

use std::cmp::Ordering;

use super::{arg, relative_index};
use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::{BuiltInObject, EvalContext};
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::object::check_array_growth;
use crate::runner::ds::operations::test_and_comparison::{same_value_zero, strict_equality};
use crate::runner::ds::operations::type_conversion::{
    to_boolean, to_integer_or_infinity, to_js_string, to_number,
};
use crate::runner::ds::value::{ArrayRef, TracedValue};

/// Register the Array built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let array = BuiltInObject::new("Array")
        .with_constructor(array_constructor)
        .add_method("push", array_push)
        .add_method("pop", array_pop)
        .add_method("shift", array_shift)
        .add_method("unshift", array_unshift)
        .add_method("slice", array_slice)
        .add_method("splice", array_splice)
        .add_method("indexOf", array_index_of)
        .add_method("lastIndexOf", array_last_index_of)
        .add_method("includes", array_includes)
        .add_method("forEach", array_for_each)
        .add_method("map", array_map)
        .add_method("filter", array_filter)
        .add_method("reduce", array_reduce)
        .add_method("find", array_find)
        .add_method("findIndex", array_find_index)
        .add_method("every", array_every)
        .add_method("some", array_some)
        .add_method("join", array_join)
        .add_method("concat", array_concat)
        .add_method("reverse", array_reverse)
        .add_method("sort", array_sort)
        .add_method("fill", array_fill)
        .add_method("toString", array_to_string)
        .add_static_method("isArray", is_array)
        .add_static_method("of", array_of)
        .add_static_method("from", array_from);

    registry.register_object(array);
}

fn this_array(this: &TracedValue, method: &str) -> Result<ArrayRef, EvalError> {
    match this {
        TracedValue::Array(a) => Ok(a.clone()),
        other => Err(EvalError::type_error(format!(
            "Array.prototype.{} called on {}",
            method,
            other.type_name()
        ))),
    }
}

fn callback(args: &[TracedValue], method: &str) -> Result<TracedValue, EvalError> {
    let cb = arg(args, 0);
    if cb.is_callable() {
        Ok(cb)
    } else {
        Err(EvalError::type_error(format!(
            "{} is not a function (in Array.prototype.{})",
            cb, method
        )))
    }
}

fn item_at(arr: &ArrayRef, idx: usize) -> Option<TracedValue> {
    arr.borrow().get(idx).cloned()
}

/// Calls `cb(item, index, array)` for each element present when the
/// iteration reaches it, stopping early when `visit` says so.
fn for_each_item<F>(
    ctx: &mut EvalContext,
    this: &TracedValue,
    arr: &ArrayRef,
    cb: &TracedValue,
    mut visit: F,
) -> Result<(), EvalError>
where
    F: FnMut(usize, TracedValue, TracedValue) -> bool,
{
    let len = arr.borrow().len();
    for idx in 0..len {
        let item = match item_at(arr, idx) {
            Some(v) => v,
            None => break,
        };
        let result = ctx.call_function(
            cb,
            TracedValue::Undefined,
            vec![item.clone(), TracedValue::Number(idx as f64), this.clone()],
        )?;
        if !visit(idx, item, result) {
            break;
        }
    }
    Ok(())
}

/// Array constructor.
fn array_constructor(
    ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    if let [TracedValue::Number(n)] = args.as_slice() {
        if *n < 0.0 || n.fract() != 0.0 || *n > u32::MAX as f64 {
            return Err(EvalError::RangeError("Invalid array length".to_string()));
        }
        check_array_growth(0, *n as usize, ctx.max_array_growth)?;
        return Ok(TracedValue::new_array(vec![
            TracedValue::Undefined;
            *n as usize
        ]));
    }
    Ok(TracedValue::new_array(args))
}

/// Array.isArray
fn is_array(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Boolean(matches!(
        arg(&args, 0),
        TracedValue::Array(_)
    )))
}

/// Array.of
fn array_of(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::new_array(args))
}

/// Array.from, for arrays and strings.
fn array_from(
    ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let items: Vec<TracedValue> = match arg(&args, 0) {
        TracedValue::Array(a) => a.borrow().clone(),
        TracedValue::String(s) => s.chars().map(|c| TracedValue::String(c.to_string())).collect(),
        TracedValue::Undefined | TracedValue::Null => {
            return Err(EvalError::type_error("Array.from requires an array-like object"))
        }
        _ => Vec::new(),
    };
    let mapper = arg(&args, 1);
    if !mapper.is_callable() {
        return Ok(TracedValue::new_array(items));
    }
    let mut mapped = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        mapped.push(ctx.call_function(
            &mapper,
            TracedValue::Undefined,
            vec![item, TracedValue::Number(idx as f64)],
        )?);
    }
    Ok(TracedValue::new_array(mapped))
}

/// Array.prototype.push
fn array_push(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "push")?;
    let mut items = arr.borrow_mut();
    items.extend(args);
    Ok(TracedValue::Number(items.len() as f64))
}

/// Array.prototype.pop
fn array_pop(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "pop")?;
    let popped = arr.borrow_mut().pop();
    Ok(popped.unwrap_or(TracedValue::Undefined))
}

/// Array.prototype.shift
fn array_shift(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "shift")?;
    let mut items = arr.borrow_mut();
    if items.is_empty() {
        return Ok(TracedValue::Undefined);
    }
    Ok(items.remove(0))
}

/// Array.prototype.unshift
fn array_unshift(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "unshift")?;
    let mut items = arr.borrow_mut();
    items.splice(0..0, args);
    Ok(TracedValue::Number(items.len() as f64))
}

/// Array.prototype.slice
fn array_slice(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "slice")?;
    let items = arr.borrow();
    let len = items.len();
    let start = relative_index(args.first(), len, 0);
    let end = relative_index(args.get(1), len, len);
    let sliced = if start < end {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Ok(TracedValue::new_array(sliced))
}

/// Array.prototype.splice
fn array_splice(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "splice")?;
    let mut items = arr.borrow_mut();
    let len = items.len();
    if args.is_empty() {
        return Ok(TracedValue::new_array(Vec::new()));
    }
    let start = relative_index(args.first(), len, 0);
    let delete_count = match args.get(1) {
        None => len - start,
        Some(v) => (to_integer_or_infinity(v).max(0.0) as usize).min(len - start),
    };
    let inserted: Vec<TracedValue> = args.into_iter().skip(2).collect();
    let removed: Vec<TracedValue> = items.splice(start..start + delete_count, inserted).collect();
    Ok(TracedValue::new_array(removed))
}

/// Array.prototype.indexOf
fn array_index_of(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "indexOf")?;
    let items = arr.borrow();
    let search = arg(&args, 0);
    let from = relative_index(args.get(1), items.len(), 0);
    let found = items
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, item)| strict_equality(item, &search))
        .map(|(idx, _)| idx as f64)
        .unwrap_or(-1.0);
    Ok(TracedValue::Number(found))
}

/// Array.prototype.lastIndexOf
fn array_last_index_of(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "lastIndexOf")?;
    let items = arr.borrow();
    let search = arg(&args, 0);
    let found = items
        .iter()
        .enumerate()
        .rev()
        .find(|(_, item)| strict_equality(item, &search))
        .map(|(idx, _)| idx as f64)
        .unwrap_or(-1.0);
    Ok(TracedValue::Number(found))
}

/// Array.prototype.includes
fn array_includes(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "includes")?;
    let search = arg(&args, 0);
    let found = arr.borrow().iter().any(|item| same_value_zero(item, &search));
    Ok(TracedValue::Boolean(found))
}

/// Array.prototype.forEach
fn array_for_each(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "forEach")?;
    let cb = callback(&args, "forEach")?;
    for_each_item(ctx, &this, &arr, &cb, |_, _, _| true)?;
    Ok(TracedValue::Undefined)
}

/// Array.prototype.map
fn array_map(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "map")?;
    let cb = callback(&args, "map")?;
    let mut mapped = Vec::new();
    for_each_item(ctx, &this, &arr, &cb, |_, _, result| {
        mapped.push(result);
        true
    })?;
    Ok(TracedValue::new_array(mapped))
}

/// Array.prototype.filter
fn array_filter(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "filter")?;
    let cb = callback(&args, "filter")?;
    let mut kept = Vec::new();
    for_each_item(ctx, &this, &arr, &cb, |_, item, result| {
        if to_boolean(&result) {
            kept.push(item);
        }
        true
    })?;
    Ok(TracedValue::new_array(kept))
}

/// Array.prototype.reduce
fn array_reduce(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "reduce")?;
    let cb = callback(&args, "reduce")?;
    let len = arr.borrow().len();
    let (mut acc, start) = match args.get(1) {
        Some(initial) => (initial.clone(), 0),
        None => match item_at(&arr, 0) {
            Some(first) => (first, 1),
            None => {
                return Err(EvalError::type_error(
                    "Reduce of empty array with no initial value",
                ))
            }
        },
    };
    for idx in start..len {
        let item = match item_at(&arr, idx) {
            Some(v) => v,
            None => break,
        };
        acc = ctx.call_function(
            &cb,
            TracedValue::Undefined,
            vec![acc, item, TracedValue::Number(idx as f64), this.clone()],
        )?;
    }
    Ok(acc)
}

/// Array.prototype.find
fn array_find(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "find")?;
    let cb = callback(&args, "find")?;
    let mut found = TracedValue::Undefined;
    for_each_item(ctx, &this, &arr, &cb, |_, item, result| {
        if to_boolean(&result) {
            found = item;
            return false;
        }
        true
    })?;
    Ok(found)
}

/// Array.prototype.findIndex
fn array_find_index(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "findIndex")?;
    let cb = callback(&args, "findIndex")?;
    let mut found = -1.0;
    for_each_item(ctx, &this, &arr, &cb, |idx, _, result| {
        if to_boolean(&result) {
            found = idx as f64;
            return false;
        }
        true
    })?;
    Ok(TracedValue::Number(found))
}

/// Array.prototype.every
fn array_every(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "every")?;
    let cb = callback(&args, "every")?;
    let mut all = true;
    for_each_item(ctx, &this, &arr, &cb, |_, _, result| {
        all = to_boolean(&result);
        all
    })?;
    Ok(TracedValue::Boolean(all))
}

/// Array.prototype.some
fn array_some(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "some")?;
    let cb = callback(&args, "some")?;
    let mut any = false;
    for_each_item(ctx, &this, &arr, &cb, |_, _, result| {
        any = to_boolean(&result);
        !any
    })?;
    Ok(TracedValue::Boolean(any))
}

fn join(arr: &ArrayRef, this: &TracedValue, separator: &str) -> String {
    arr.borrow()
        .iter()
        .map(|item| {
            if item.is_nullish() || item.same_identity(this) {
                String::new()
            } else {
                to_js_string(item)
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Array.prototype.join
fn array_join(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "join")?;
    let separator = match arg(&args, 0) {
        TracedValue::Undefined => ",".to_string(),
        other => to_js_string(&other),
    };
    Ok(TracedValue::String(join(&arr, &this, &separator)))
}

/// Array.prototype.toString
fn array_to_string(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "toString")?;
    Ok(TracedValue::String(join(&arr, &this, ",")))
}

/// Array.prototype.concat
fn array_concat(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "concat")?;
    let mut joined = arr.borrow().clone();
    for value in args {
        match value {
            TracedValue::Array(other) => joined.extend(other.borrow().iter().cloned()),
            other => joined.push(other),
        }
    }
    Ok(TracedValue::new_array(joined))
}

/// Array.prototype.reverse
fn array_reverse(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "reverse")?;
    arr.borrow_mut().reverse();
    Ok(this)
}

/// Array.prototype.fill
fn array_fill(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "fill")?;
    {
        let mut items = arr.borrow_mut();
        let len = items.len();
        let start = relative_index(args.get(1), len, 0);
        let end = relative_index(args.get(2), len, len);
        let value = arg(&args, 0);
        for item in items.iter_mut().take(end).skip(start) {
            *item = value.clone();
        }
    }
    Ok(this)
}

fn default_compare(a: &TracedValue, b: &TracedValue) -> Ordering {
    match (a, b) {
        (TracedValue::Undefined, TracedValue::Undefined) => Ordering::Equal,
        (TracedValue::Undefined, _) => Ordering::Greater,
        (_, TracedValue::Undefined) => Ordering::Less,
        _ => to_js_string(a)
            .encode_utf16()
            .cmp(to_js_string(b).encode_utf16()),
    }
}

/// Stable merge sort with a comparator that may fail. The host's sort cannot
/// be used because a user comparator may be inconsistent.
fn merge_sort<F>(mut items: Vec<TracedValue>, cmp: &mut F) -> Result<Vec<TracedValue>, EvalError>
where
    F: FnMut(&TracedValue, &TracedValue) -> Result<Ordering, EvalError>,
{
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, cmp)?;
    let right = merge_sort(right, cmp)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if cmp(&right[j], &left[i])? == Ordering::Less {
            merged.push(right[j].clone());
            j += 1;
        } else {
            merged.push(left[i].clone());
            i += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    Ok(merged)
}

/// Array.prototype.sort
fn array_sort(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let arr = this_array(&this, "sort")?;
    let comparator = arg(&args, 0);
    if !comparator.is_callable() && comparator != TracedValue::Undefined {
        return Err(EvalError::type_error(
            "The comparison function must be either a function or undefined",
        ));
    }
    let items = arr.borrow().clone();
    let sorted = if comparator.is_callable() {
        merge_sort(items, &mut |a, b| {
            if let (TracedValue::Undefined, _) | (_, TracedValue::Undefined) = (a, b) {
                return Ok(default_compare(a, b));
            }
            let result = ctx.call_function(
                &comparator,
                TracedValue::Undefined,
                vec![a.clone(), b.clone()],
            )?;
            let n = to_number(&result);
            Ok(if n < 0.0 {
                Ordering::Less
            } else if n > 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            })
        })?
    } else {
        merge_sort(items, &mut |a, b| Ok(default_compare(a, b)))?
    };
    *arr.borrow_mut() = sorted;
    Ok(this)
}
