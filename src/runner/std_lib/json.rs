//! JSON built-in object.
//!
//! Provides JSON.parse and JSON.stringify on top of `serde_json`.

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::arg;
use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::{BuiltInObject, EvalContext};
use crate::runner::ds::error::{error_object, EvalError};
use crate::runner::ds::operations::type_conversion::{to_integer_or_infinity, to_js_string};
use crate::runner::ds::value::TracedValue;

/// Register the JSON object with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let json = BuiltInObject::new("JSON")
        .with_no_prototype()
        .add_static_method("parse", json_parse)
        .add_static_method("stringify", json_stringify);

    registry.register_object(json);
}

/// Values `JSON.stringify` drops from objects and turns into `null` in arrays.
fn is_skipped(value: &TracedValue) -> bool {
    matches!(value, TracedValue::Undefined | TracedValue::Function(_))
}

/// `JSON.stringify` view of a value.
struct JsonView<'a> {
    value: &'a TracedValue,
    depth: usize,
}

impl Serialize for JsonView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.depth > 64 {
            return Err(S::Error::custom("Converting circular structure to JSON"));
        }
        let nested = |value| JsonView {
            value,
            depth: self.depth + 1,
        };
        match self.value {
            TracedValue::Undefined | TracedValue::Null | TracedValue::Function(_) => {
                serializer.serialize_unit()
            }
            TracedValue::Boolean(b) => serializer.serialize_bool(*b),
            TracedValue::Number(n) => {
                if !n.is_finite() {
                    serializer.serialize_unit()
                } else if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            TracedValue::String(s) | TracedValue::Unresolved(s) => serializer.serialize_str(s),
            TracedValue::ScopeRef(_) => serializer.serialize_map(Some(0))?.end(),
            TracedValue::Array(a) => {
                let items = a.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    if is_skipped(item) {
                        seq.serialize_element(&())?;
                    } else {
                        seq.serialize_element(&nested(item))?;
                    }
                }
                seq.end()
            }
            TracedValue::Object(o) => {
                let o = o.borrow();
                let mut map = serializer.serialize_map(None)?;
                for (k, v) in o.properties.iter().filter(|(_, v)| !is_skipped(v)) {
                    map.serialize_entry(k, &nested(v))?;
                }
                map.end()
            }
        }
    }
}

fn from_json(value: Value) -> TracedValue {
    match value {
        Value::Null => TracedValue::Null,
        Value::Bool(b) => TracedValue::Boolean(b),
        Value::Number(n) => TracedValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => TracedValue::String(s),
        Value::Array(items) => TracedValue::new_array(items.into_iter().map(from_json).collect()),
        Value::Object(map) => {
            TracedValue::new_object(map.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

/// JSON.parse
fn json_parse(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let text = to_js_string(&arg(&args, 0));
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(from_json(value)),
        Err(e) => Err(EvalError::Thrown(error_object(
            "SyntaxError",
            &format!("JSON.parse: {}", e),
        ))),
    }
}

/// JSON.stringify. A numeric third argument selects indentation.
fn json_stringify(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let value = arg(&args, 0);
    if is_skipped(&value) {
        return Ok(TracedValue::Undefined);
    }
    let view = JsonView {
        value: &value,
        depth: 0,
    };
    let indent_str = match arg(&args, 2) {
        space @ TracedValue::Number(_) => {
            " ".repeat(to_integer_or_infinity(&space).clamp(0.0, 10.0) as usize)
        }
        TracedValue::String(s) => s.chars().take(10).collect(),
        _ => String::new(),
    };
    let result = if indent_str.is_empty() {
        serde_json::to_string(&view)
    } else {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent_str.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        view.serialize(&mut ser)
            .map(|_| String::from_utf8_lossy(&buf).into_owned())
    };
    result
        .map(TracedValue::String)
        .map_err(|e| EvalError::type_error(e.to_string()))
}
