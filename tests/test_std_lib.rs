//! Tests for the built-in objects.
//!
//! These tests go through the registry and method dispatch the same way
//! replayed call chains do.

extern crate literal_tracer;

use literal_tracer::runner::builtins::registry::BuiltInRegistry;
use literal_tracer::runner::builtins::types::EvalContext;
use literal_tracer::runner::ds::error::EvalError;
use literal_tracer::TracedValue;

fn strings(items: &[&str]) -> TracedValue {
    TracedValue::new_array(items.iter().map(|s| TracedValue::from(*s)).collect())
}

fn numbers(items: &[i32]) -> TracedValue {
    TracedValue::new_array(items.iter().map(|n| TracedValue::from(*n)).collect())
}

/// `receiver.method(...args)` through method dispatch.
fn call_method(receiver: TracedValue, method: &str, args: Vec<TracedValue>) -> TracedValue {
    let mut ctx = EvalContext::with_core();
    ctx.call_method(&receiver, method, args)
        .expect(&format!("{}.{} should succeed", receiver.type_name(), method))
}

/// `Object.method(...args)` for a static method.
fn call_static(object: &str, method: &str, args: Vec<TracedValue>) -> TracedValue {
    let registry = BuiltInRegistry::with_core();
    let mut ctx = EvalContext::with_core();
    registry
        .get_static_method(object, method)
        .expect(&format!("{}.{} should exist", object, method))(
        &mut ctx,
        TracedValue::Undefined,
        args,
    )
    .expect(&format!("{}.{} should succeed", object, method))
}

// ============================================================================
// Registry
// ============================================================================

mod registry_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_core_objects_are_registered() {
        let registry = BuiltInRegistry::with_core();
        for name in ["Object", "Function", "Array", "String", "Number", "Boolean", "Math", "JSON"] {
            assert!(registry.has_object(name), "missing {}", name);
        }
    }

    #[test]
    fn test_unknown_method_is_reported() {
        let mut ctx = EvalContext::with_core();
        let err = ctx
            .call_method(&strings(&["a"]), "flyAway", vec![])
            .unwrap_err();
        assert!(matches!(
            err,
            EvalError::MethodNotFound { ref method, .. } if method == "flyAway"
        ));
    }

    #[test]
    fn test_methods_on_null_are_type_errors() {
        let mut ctx = EvalContext::with_core();
        let err = ctx
            .call_method(&TracedValue::Null, "toString", vec![])
            .unwrap_err();
        assert!(matches!(err, EvalError::TypeError(_)));
    }
}

// ============================================================================
// Math
// ============================================================================

mod math_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_math_abs() {
        assert_eq!(call_static("Math", "abs", vec![(-5).into()]), TracedValue::from(5));
    }

    #[test]
    fn test_math_floor_and_ceil() {
        assert_eq!(call_static("Math", "floor", vec![3.7.into()]), TracedValue::from(3));
        assert_eq!(call_static("Math", "ceil", vec![3.2.into()]), TracedValue::from(4));
    }

    #[test]
    fn test_math_min_max() {
        let args = vec![3.into(), 9.into(), (-1).into()];
        assert_eq!(call_static("Math", "max", args.clone()), TracedValue::from(9));
        assert_eq!(call_static("Math", "min", args), TracedValue::from(-1));
    }

    #[test]
    fn test_math_pow_and_sqrt() {
        assert_eq!(call_static("Math", "pow", vec![2.into(), 10.into()]), TracedValue::from(1024));
        assert_eq!(call_static("Math", "sqrt", vec![81.into()]), TracedValue::from(9));
    }

    #[test]
    fn test_math_constants() {
        let registry = BuiltInRegistry::with_core();
        assert_eq!(
            registry.get_property("Math", "PI"),
            Some(&TracedValue::from(std::f64::consts::PI))
        );
    }
}

// ============================================================================
// String
// ============================================================================

mod string_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_of() {
        assert_eq!(call_method("bla".into(), "indexOf", vec!["a".into()]), TracedValue::from(2));
        assert_eq!(call_method("bla".into(), "indexOf", vec!["z".into()]), TracedValue::from(-1));
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(call_method("Bla".into(), "toUpperCase", vec![]), TracedValue::from("BLA"));
        assert_eq!(call_method("Bla".into(), "toLowerCase", vec![]), TracedValue::from("bla"));
    }

    #[test]
    fn test_split() {
        assert_eq!(
            call_method("a,b,c".into(), "split", vec![",".into()]),
            strings(&["a", "b", "c"])
        );
        assert_eq!(
            call_method("bla".into(), "split", vec!["".into()]),
            strings(&["b", "l", "a"])
        );
    }

    #[test]
    fn test_trim_and_concat() {
        assert_eq!(call_method("  x  ".into(), "trim", vec![]), TracedValue::from("x"));
        assert_eq!(
            call_method("foo".into(), "concat", vec!["_".into(), "bar".into()]),
            TracedValue::from("foo_bar")
        );
    }

    #[test]
    fn test_char_access() {
        assert_eq!(call_method("abc".into(), "charAt", vec![1.into()]), TracedValue::from("b"));
        assert_eq!(call_method("abc".into(), "charCodeAt", vec![0.into()]), TracedValue::from(97));
    }

    #[test]
    fn test_predicates() {
        assert_eq!(
            call_method("literal".into(), "startsWith", vec!["lit".into()]),
            TracedValue::from(true)
        );
        assert_eq!(
            call_method("literal".into(), "endsWith", vec!["lit".into()]),
            TracedValue::from(false)
        );
        assert_eq!(
            call_method("literal".into(), "includes", vec!["era".into()]),
            TracedValue::from(true)
        );
    }

    #[test]
    fn test_repeat() {
        assert_eq!(call_method("ab".into(), "repeat", vec![3.into()]), TracedValue::from("ababab"));
    }
}

// ============================================================================
// Array
// ============================================================================

mod array_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_returns_length_and_mutates() {
        let arr = strings(&["a"]);
        assert_eq!(call_method(arr.clone(), "push", vec!["b".into()]), TracedValue::from(2));
        assert_eq!(arr, strings(&["a", "b"]));
    }

    #[test]
    fn test_pop_and_shift() {
        let arr = strings(&["a", "b", "c"]);
        assert_eq!(call_method(arr.clone(), "pop", vec![]), TracedValue::from("c"));
        assert_eq!(call_method(arr.clone(), "shift", vec![]), TracedValue::from("a"));
        assert_eq!(arr, strings(&["b"]));
    }

    #[test]
    fn test_slice_leaves_receiver() {
        let arr = strings(&["a", "b", "c", "b"]);
        assert_eq!(
            call_method(arr.clone(), "slice", vec![0.into(), 2.into()]),
            strings(&["a", "b"])
        );
        assert_eq!(arr, strings(&["a", "b", "c", "b"]));
    }

    #[test]
    fn test_splice_with_insertion() {
        let arr = strings(&["a", "b", "c"]);
        let removed = call_method(arr.clone(), "splice", vec![2.into(), 3.into(), "x".into()]);
        assert_eq!(removed, strings(&["c"]));
        assert_eq!(arr, strings(&["a", "b", "x"]));
    }

    #[test]
    fn test_index_of_and_includes() {
        let arr = strings(&["a", "b", "c", "b"]);
        assert_eq!(call_method(arr.clone(), "indexOf", vec!["b".into()]), TracedValue::from(1));
        assert_eq!(call_method(arr.clone(), "lastIndexOf", vec!["b".into()]), TracedValue::from(3));
        assert_eq!(call_method(arr, "includes", vec!["z".into()]), TracedValue::from(false));
    }

    #[test]
    fn test_reverse_in_place() {
        let arr = numbers(&[1, 2, 3]);
        let result = call_method(arr.clone(), "reverse", vec![]);
        assert!(result.same_identity(&arr));
        assert_eq!(arr, numbers(&[3, 2, 1]));
    }

    #[test]
    fn test_join_and_concat() {
        assert_eq!(
            call_method(numbers(&[1, 2, 3]), "join", vec!["+".into()]),
            TracedValue::from("1+2+3")
        );
        assert_eq!(call_method(numbers(&[1, 2]), "join", vec![]), TracedValue::from("1,2"));
        assert_eq!(
            call_method(numbers(&[1]), "concat", vec![numbers(&[2, 3]), 4.into()]),
            numbers(&[1, 2, 3, 4])
        );
    }

    #[test]
    fn test_is_array() {
        assert_eq!(call_static("Array", "isArray", vec![numbers(&[])]), TracedValue::from(true));
        assert_eq!(call_static("Array", "isArray", vec!["x".into()]), TracedValue::from(false));
    }
}

// ============================================================================
// Number, Boolean, JSON, Object
// ============================================================================

mod misc_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_number_to_fixed() {
        assert_eq!(
            call_method(3.14159.into(), "toFixed", vec![2.into()]),
            TracedValue::from("3.14")
        );
    }

    #[test]
    fn test_number_parse_int() {
        assert_eq!(call_static("Number", "parseInt", vec!["42px".into()]), TracedValue::from(42));
        assert!(call_static("Number", "parseInt", vec!["px".into()])
            .as_number()
            .unwrap()
            .is_nan());
    }

    #[test]
    fn test_boolean_to_string() {
        assert_eq!(call_method(true.into(), "toString", vec![]), TracedValue::from("true"));
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let text = r#"{"name":"tracer","tags":["a","b"],"n":1}"#;
        let parsed = call_static("JSON", "parse", vec![text.into()]);
        assert_eq!(
            call_static("Object", "keys", vec![parsed.clone()]),
            strings(&["name", "tags", "n"])
        );
        assert_eq!(call_static("JSON", "stringify", vec![parsed]), TracedValue::from(text));
    }

    #[test]
    fn test_json_stringify_primitives() {
        assert_eq!(call_static("JSON", "stringify", vec!["x".into()]), TracedValue::from("\"x\""));
        assert_eq!(call_static("JSON", "stringify", vec![2.5.into()]), TracedValue::from("2.5"));
    }
}
