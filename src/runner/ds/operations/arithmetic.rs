use std::cmp::Ordering;
use std::rc::Rc;

use crate::parser::ast::BinaryOperator;
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::object::has_property;
use crate::runner::ds::operations::test_and_comparison::{
    compare_values, loose_equality, strict_equality,
};
use crate::runner::ds::operations::type_conversion::{
    to_js_string, to_number, to_primitive, to_property_key,
};
use crate::runner::ds::value::TracedValue;

/// The `+` operator: concatenates when either primitive operand is a string.
pub fn add_values(a: &TracedValue, b: &TracedValue) -> TracedValue {
    let pa = to_primitive(a);
    let pb = to_primitive(b);
    match (&pa, &pb) {
        (TracedValue::String(_), _) | (_, TracedValue::String(_)) => {
            TracedValue::String(format!("{}{}", to_js_string(&pa), to_js_string(&pb)))
        }
        _ => TracedValue::Number(to_number(&pa) + to_number(&pb)),
    }
}

pub fn apply_binary_operator(
    operator: &BinaryOperator,
    left: &TracedValue,
    right: &TracedValue,
) -> Result<TracedValue, EvalError> {
    let num = |f: fn(f64, f64) -> f64| TracedValue::Number(f(to_number(left), to_number(right)));
    let cmp = |accept: fn(Ordering) -> bool| {
        TracedValue::Boolean(compare_values(left, right).map(accept).unwrap_or(false))
    };
    Ok(match operator {
        BinaryOperator::Add => add_values(left, right),
        BinaryOperator::Subtract => num(|a, b| a - b),
        BinaryOperator::Multiply => num(|a, b| a * b),
        BinaryOperator::Divide => num(|a, b| a / b),
        BinaryOperator::Modulo => num(|a, b| a % b),
        BinaryOperator::EqualEqual => TracedValue::Boolean(loose_equality(left, right)),
        BinaryOperator::NotEqual => TracedValue::Boolean(!loose_equality(left, right)),
        BinaryOperator::StrictlyEqual => TracedValue::Boolean(strict_equality(left, right)),
        BinaryOperator::StrictlyUnequal => TracedValue::Boolean(!strict_equality(left, right)),
        BinaryOperator::LessThan => cmp(|o| o == Ordering::Less),
        BinaryOperator::LessThanEqual => cmp(|o| o != Ordering::Greater),
        BinaryOperator::GreaterThan => cmp(|o| o == Ordering::Greater),
        BinaryOperator::GreaterThanEqual => cmp(|o| o != Ordering::Less),
        BinaryOperator::In => TracedValue::Boolean(has_property(right, &to_property_key(left))?),
        BinaryOperator::InstanceOf => TracedValue::Boolean(instance_of(left, right)?),
    })
}

fn instance_of(value: &TracedValue, constructor: &TracedValue) -> Result<bool, EvalError> {
    match constructor {
        TracedValue::Function(f) => {
            let proto = match f.prototype_object() {
                Some(p) => p,
                None => return Ok(false),
            };
            let mut next = match value {
                TracedValue::Object(o) => o.borrow().prototype.clone(),
                _ => None,
            };
            while let Some(candidate) = next {
                if Rc::ptr_eq(&candidate, &proto) {
                    return Ok(true);
                }
                next = candidate.borrow().prototype.clone();
            }
            Ok(false)
        }
        // Built-in constructors are referenced by name.
        TracedValue::Unresolved(name) => Ok(match name.as_str() {
            "Object" => matches!(
                value,
                TracedValue::Object(_) | TracedValue::Array(_) | TracedValue::Function(_)
            ),
            other => value.type_name() == other,
        }),
        _ => Err(EvalError::type_error(format!(
            "Right-hand side of 'instanceof' is not callable: {}",
            constructor
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_concatenates_with_strings() {
        assert_eq!(add_values(&"a".into(), &1.into()), "a1".into());
        assert_eq!(add_values(&1.into(), &2.into()), 3.into());
        assert_eq!(
            add_values(&TracedValue::Unresolved("x".to_string()), &"y".into()),
            "xy".into()
        );
    }

    #[test]
    fn comparison_operators() {
        let r = apply_binary_operator(&BinaryOperator::LessThanEqual, &2.into(), &2.into());
        assert_eq!(r.unwrap(), true.into());
        let r = apply_binary_operator(&BinaryOperator::Modulo, &(-7).into(), &3.into());
        assert_eq!(r.unwrap(), (-1).into());
    }

    #[test]
    fn array_instance_of_builtin_name() {
        let arr = TracedValue::new_array(vec![]);
        let r = apply_binary_operator(
            &BinaryOperator::InstanceOf,
            &arr,
            &TracedValue::Unresolved("Array".to_string()),
        );
        assert_eq!(r.unwrap(), true.into());
    }
}
