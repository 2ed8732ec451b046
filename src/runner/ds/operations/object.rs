use crate::runner::ds::error::EvalError;
use crate::runner::ds::value::TracedValue;

/// Parses `key` as an array index when it is in canonical form (`"2"` but not
/// `"02"` or `"2.0"`).
pub fn canonical_index(key: &str) -> Option<usize> {
    let idx = key.parse::<usize>().ok()?;
    if idx.to_string() == key {
        Some(idx)
    } else {
        None
    }
}

/// Reads a property the way member access does. Methods are not looked up here;
/// calls go through the built-in registry.
pub fn get_property(target: &TracedValue, key: &str) -> Result<TracedValue, EvalError> {
    match target {
        TracedValue::Undefined | TracedValue::Null => Err(EvalError::type_error(format!(
            "Cannot read properties of {} (reading '{}')",
            target, key
        ))),
        TracedValue::Array(a) => {
            let items = a.borrow();
            if key == "length" {
                return Ok(TracedValue::Number(items.len() as f64));
            }
            Ok(canonical_index(key)
                .and_then(|idx| items.get(idx).cloned())
                .unwrap_or(TracedValue::Undefined))
        }
        TracedValue::String(s) => {
            if key == "length" {
                return Ok(TracedValue::Number(s.chars().count() as f64));
            }
            Ok(canonical_index(key)
                .and_then(|idx| s.chars().nth(idx))
                .map(|c| TracedValue::String(c.to_string()))
                .unwrap_or(TracedValue::Undefined))
        }
        TracedValue::Object(o) => Ok(o.borrow().lookup(key).unwrap_or(TracedValue::Undefined)),
        TracedValue::Function(f) => {
            if let Some(v) = f.get_own_property(key) {
                return Ok(v);
            }
            Ok(match key {
                "prototype" => f
                    .prototype_object()
                    .map(TracedValue::Object)
                    .unwrap_or(TracedValue::Undefined),
                "name" => TracedValue::String(f.name.clone()),
                "length" => TracedValue::Number(f.data.params.len() as f64),
                _ => TracedValue::Undefined,
            })
        }
        TracedValue::Unresolved(name) => Ok(TracedValue::Unresolved(format!("{}.{}", name, key))),
        TracedValue::Boolean(_) | TracedValue::Number(_) | TracedValue::ScopeRef(_) => {
            Ok(TracedValue::Undefined)
        }
    }
}

/// Fails when growing an array of `current` items to `len` would add more
/// than `max_growth` slots.
pub fn check_array_growth(current: usize, len: usize, max_growth: usize) -> Result<(), EvalError> {
    if len > current.saturating_add(max_growth) {
        return Err(EvalError::RangeError(format!(
            "Array length {} is more than {} past the current length {}",
            len, max_growth, current
        )));
    }
    Ok(())
}

/// Writes a property. Arrays grow for index and `length` writes, by at most
/// `max_growth` slots per write.
pub fn set_property(
    target: &TracedValue,
    key: &str,
    value: TracedValue,
    max_growth: usize,
) -> Result<(), EvalError> {
    match target {
        TracedValue::Undefined | TracedValue::Null => Err(EvalError::type_error(format!(
            "Cannot set properties of {} (setting '{}')",
            target, key
        ))),
        TracedValue::Array(a) => {
            let mut items = a.borrow_mut();
            if key == "length" {
                let len = value.as_number().unwrap_or(f64::NAN);
                if len < 0.0 || len.fract() != 0.0 || len > u32::MAX as f64 {
                    return Err(EvalError::RangeError("Invalid array length".to_string()));
                }
                check_array_growth(items.len(), len as usize, max_growth)?;
                items.resize(len as usize, TracedValue::Undefined);
            } else if let Some(idx) = canonical_index(key) {
                if idx >= items.len() {
                    check_array_growth(items.len(), idx.saturating_add(1), max_growth)?;
                    items.resize(idx + 1, TracedValue::Undefined);
                }
                items[idx] = value;
            } else {
                log::trace!("ignoring named property '{}' on array", key);
            }
            Ok(())
        }
        TracedValue::Object(o) => {
            o.borrow_mut().properties.insert(key.to_string(), value);
            Ok(())
        }
        TracedValue::Function(f) => {
            f.set_property(key, value);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Own or inherited property presence, as tested by the `in` operator.
pub fn has_property(target: &TracedValue, key: &str) -> Result<bool, EvalError> {
    match target {
        TracedValue::Array(a) => Ok(key == "length"
            || canonical_index(key)
                .map(|idx| idx < a.borrow().len())
                .unwrap_or(false)),
        TracedValue::Object(o) => Ok(o.borrow().lookup(key).is_some()),
        TracedValue::Function(f) => Ok(f.get_own_property(key).is_some()
            || matches!(key, "prototype" | "name" | "length")),
        _ => Err(EvalError::type_error(format!(
            "Cannot use 'in' operator to search for '{}' in {}",
            key, target
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_length_and_indices() {
        let arr = TracedValue::new_array(vec!["a".into(), "b".into()]);
        assert_eq!(get_property(&arr, "length").unwrap(), 2.into());
        assert_eq!(get_property(&arr, "1").unwrap(), "b".into());
        assert_eq!(get_property(&arr, "01").unwrap(), TracedValue::Undefined);
        set_property(&arr, "3", "d".into(), 10).unwrap();
        assert_eq!(get_property(&arr, "length").unwrap(), 4.into());
        assert_eq!(get_property(&arr, "2").unwrap(), TracedValue::Undefined);
    }

    #[test]
    fn array_growth_is_bounded() {
        let arr = TracedValue::new_array(vec!["a".into()]);
        assert!(matches!(
            set_property(&arr, "4294967294", 1.into(), 100),
            Err(EvalError::RangeError(_))
        ));
        assert!(matches!(
            set_property(&arr, "length", 4294967295.0.into(), 100),
            Err(EvalError::RangeError(_))
        ));
        set_property(&arr, "100", "z".into(), 100).unwrap();
        assert_eq!(get_property(&arr, "length").unwrap(), 101.into());
    }

    #[test]
    fn unresolved_members_extend_the_path() {
        let v = TracedValue::Unresolved("config".to_string());
        assert_eq!(
            get_property(&v, "port").unwrap(),
            TracedValue::Unresolved("config.port".to_string())
        );
    }

    #[test]
    fn reading_from_undefined_fails() {
        assert!(matches!(
            get_property(&TracedValue::Undefined, "x"),
            Err(EvalError::TypeError(_))
        ));
    }
}
