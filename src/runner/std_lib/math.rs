//! Math built-in object.
//!
//! Provides mathematical constants and functions. `Math.random` is left out
//! so replayed chains stay deterministic.

use super::arg;
use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::{BuiltInObject, EvalContext};
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::type_conversion::to_number;
use crate::runner::ds::value::TracedValue;

/// Defines a `Math` function applying `$op` to its first argument.
macro_rules! unary_math {
    ($name:ident, $op:expr) => {
        fn $name(
            _ctx: &mut EvalContext,
            _this: TracedValue,
            args: Vec<TracedValue>,
        ) -> Result<TracedValue, EvalError> {
            let f: fn(f64) -> f64 = $op;
            Ok(TracedValue::Number(f(to_number(&arg(&args, 0)))))
        }
    };
}

/// Register the Math object with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let math = BuiltInObject::new("Math")
        .with_no_prototype()
        .add_property("E", TracedValue::Number(std::f64::consts::E))
        .add_property("LN10", TracedValue::Number(std::f64::consts::LN_10))
        .add_property("LN2", TracedValue::Number(std::f64::consts::LN_2))
        .add_property("PI", TracedValue::Number(std::f64::consts::PI))
        .add_property("SQRT2", TracedValue::Number(std::f64::consts::SQRT_2))
        .add_static_method("abs", math_abs)
        .add_static_method("floor", math_floor)
        .add_static_method("ceil", math_ceil)
        .add_static_method("round", math_round)
        .add_static_method("trunc", math_trunc)
        .add_static_method("sign", math_sign)
        .add_static_method("sqrt", math_sqrt)
        .add_static_method("log", math_log)
        .add_static_method("min", math_min)
        .add_static_method("max", math_max)
        .add_static_method("pow", math_pow);

    registry.register_object(math);
}

unary_math!(math_abs, f64::abs);
unary_math!(math_floor, f64::floor);
unary_math!(math_ceil, f64::ceil);
unary_math!(math_trunc, f64::trunc);
unary_math!(math_sqrt, f64::sqrt);
unary_math!(math_log, f64::ln);
// Halves round towards +Infinity, unlike f64::round.
unary_math!(math_round, |n| if n.is_finite() { (n + 0.5).floor() } else { n });
unary_math!(math_sign, |n| if n.is_nan() || n == 0.0 { n } else { n.signum() });

fn fold_numbers(args: &[TracedValue], start: f64, pick: fn(f64, f64) -> f64) -> f64 {
    let mut acc = start;
    for v in args {
        let n = to_number(v);
        if n.is_nan() {
            return f64::NAN;
        }
        acc = pick(acc, n);
    }
    acc
}

/// Math.min
fn math_min(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Number(fold_numbers(&args, f64::INFINITY, f64::min)))
}

/// Math.max
fn math_max(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Number(fold_numbers(&args, f64::NEG_INFINITY, f64::max)))
}

/// Math.pow
fn math_pow(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let base = to_number(&arg(&args, 0));
    let exponent = to_number(&arg(&args, 1));
    Ok(TracedValue::Number(base.powf(exponent)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_half_up() {
        let mut ctx = EvalContext::with_core();
        let r = math_round(&mut ctx, TracedValue::Undefined, vec![2.5.into()]).unwrap();
        assert_eq!(r, 3.into());
        let r = math_round(&mut ctx, TracedValue::Undefined, vec![(-2.5).into()]).unwrap();
        assert_eq!(r, (-2).into());
    }

    #[test]
    fn max_of_nothing_is_negative_infinity() {
        let mut ctx = EvalContext::with_core();
        let r = math_max(&mut ctx, TracedValue::Undefined, vec![]).unwrap();
        assert_eq!(r, f64::NEG_INFINITY.into());
        let r = math_max(&mut ctx, TracedValue::Undefined, vec![1.into(), 7.into()]).unwrap();
        assert_eq!(r, 7.into());
    }
}
