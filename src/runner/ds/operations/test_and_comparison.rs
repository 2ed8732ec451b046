use std::cmp::Ordering;

use crate::runner::ds::operations::type_conversion::{to_number, to_primitive};
use crate::runner::ds::value::TracedValue;

pub fn strict_equality(a: &TracedValue, b: &TracedValue) -> bool {
    match (a, b) {
        (TracedValue::Undefined, TracedValue::Undefined) => true,
        (TracedValue::Null, TracedValue::Null) => true,
        (TracedValue::Boolean(x), TracedValue::Boolean(y)) => x == y,
        (TracedValue::Number(x), TracedValue::Number(y)) => x == y,
        (TracedValue::String(x), TracedValue::String(y)) => x == y,
        (TracedValue::Unresolved(x), TracedValue::Unresolved(y)) => x == y,
        (TracedValue::ScopeRef(x), TracedValue::ScopeRef(y)) => x == y,
        (TracedValue::Array(_), TracedValue::Array(_))
        | (TracedValue::Object(_), TracedValue::Object(_))
        | (TracedValue::Function(_), TracedValue::Function(_)) => a.same_identity(b),
        _ => false,
    }
}

pub fn loose_equality(a: &TracedValue, b: &TracedValue) -> bool {
    use TracedValue::*;
    match (a, b) {
        (Undefined | Null, Undefined | Null) => true,
        (Undefined | Null, _) | (_, Undefined | Null) => false,
        (Number(_), String(_)) | (String(_), Number(_)) => to_number(a) == to_number(b),
        (Boolean(_), _) => loose_equality(&Number(to_number(a)), b),
        (_, Boolean(_)) => loose_equality(a, &Number(to_number(b))),
        (Array(_) | Object(_) | Function(_), Array(_) | Object(_) | Function(_)) => {
            a.same_identity(b)
        }
        (Array(_) | Object(_) | Function(_) | ScopeRef(_) | Unresolved(_), _)
        | (_, Array(_) | Object(_) | Function(_) | ScopeRef(_) | Unresolved(_)) => {
            if strict_equality(a, b) {
                return true;
            }
            loose_equality(&to_primitive(a), &to_primitive(b))
        }
        _ => strict_equality(a, b),
    }
}

/// `SameValueZero`, used by `includes`: like `===` except NaN equals NaN.
pub fn same_value_zero(a: &TracedValue, b: &TracedValue) -> bool {
    match (a, b) {
        (TracedValue::Number(x), TracedValue::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => strict_equality(a, b),
    }
}

/// Abstract relational comparison. `None` when either side is NaN.
pub fn compare_values(a: &TracedValue, b: &TracedValue) -> Option<Ordering> {
    let pa = to_primitive(a);
    let pb = to_primitive(b);
    match (&pa, &pb) {
        (TracedValue::String(x), TracedValue::String(y)) => {
            Some(x.encode_utf16().cmp(y.encode_utf16()))
        }
        _ => to_number(&pa).partial_cmp(&to_number(&pb)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_equality_coerces() {
        assert!(loose_equality(&"1".into(), &1.into()));
        assert!(loose_equality(&TracedValue::Null, &TracedValue::Undefined));
        assert!(loose_equality(&true.into(), &1.into()));
        assert!(!loose_equality(&TracedValue::Null, &0.into()));
        let arr = TracedValue::new_array(vec![1.into(), 2.into()]);
        assert!(loose_equality(&arr, &"1,2".into()));
    }

    #[test]
    fn strict_equality_respects_identity() {
        let a = TracedValue::new_array(vec![]);
        let b = TracedValue::new_array(vec![]);
        assert!(strict_equality(&a, &a.clone()));
        assert!(!strict_equality(&a, &b));
        assert!(!strict_equality(&f64::NAN.into(), &f64::NAN.into()));
        assert!(same_value_zero(&f64::NAN.into(), &f64::NAN.into()));
    }

    #[test]
    fn strings_compare_lexicographically() {
        assert_eq!(compare_values(&"10".into(), &"9".into()), Some(Ordering::Less));
        assert_eq!(compare_values(&10.into(), &9.into()), Some(Ordering::Greater));
        assert_eq!(compare_values(&"a".into(), &f64::NAN.into()), None);
    }
}
