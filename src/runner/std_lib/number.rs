//! Number built-in.

use super::arg;
use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::{BuiltInObject, EvalContext};
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::type_conversion::{
    number_to_string, to_integer_or_infinity, to_js_string, to_number,
};
use crate::runner::ds::value::TracedValue;

/// Register the Number built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let number = BuiltInObject::new("Number")
        .with_constructor(number_constructor)
        .add_method("toFixed", number_to_fixed)
        .add_method("toString", number_to_string_method)
        .add_method("valueOf", number_value_of)
        .add_static_method("isInteger", number_is_integer)
        .add_static_method("isFinite", number_is_finite)
        .add_static_method("isNaN", number_is_nan)
        .add_static_method("parseFloat", number_parse_float)
        .add_static_method("parseInt", number_parse_int)
        .add_property("MAX_SAFE_INTEGER", TracedValue::Number(9_007_199_254_740_991.0))
        .add_property("MIN_SAFE_INTEGER", TracedValue::Number(-9_007_199_254_740_991.0))
        .add_property("EPSILON", TracedValue::Number(f64::EPSILON))
        .add_property("NaN", TracedValue::Number(f64::NAN));

    registry.register_object(number);
}

fn this_number(this: &TracedValue, method: &str) -> Result<f64, EvalError> {
    match this {
        TracedValue::Number(n) => Ok(*n),
        other => Err(EvalError::type_error(format!(
            "Number.prototype.{} requires that 'this' be a Number, got {}",
            method,
            other.type_name()
        ))),
    }
}

/// Number constructor, used as a conversion.
fn number_constructor(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Number(match args.first() {
        None => 0.0,
        Some(v) => to_number(v),
    }))
}

/// Number.prototype.toFixed
fn number_to_fixed(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let n = this_number(&this, "toFixed")?;
    let digits = to_integer_or_infinity(&arg(&args, 0));
    if !(0.0..=100.0).contains(&digits) {
        return Err(EvalError::RangeError(
            "toFixed() digits argument must be between 0 and 100".to_string(),
        ));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(TracedValue::String(number_to_string(n)));
    }
    Ok(TracedValue::String(format!("{:.*}", digits as usize, n)))
}

fn digit_char(d: u32) -> char {
    std::char::from_digit(d, 36).unwrap_or('?')
}

/// Renders `n` in `radix`, with up to 20 fractional digits.
fn to_radix_string(n: f64, radix: u32) -> String {
    if n.is_nan() || n.is_infinite() {
        return number_to_string(n);
    }
    let negative = n < 0.0;
    let n = n.abs();
    let mut int_part = n.trunc();
    let mut frac = n - int_part;

    let mut int_digits = Vec::new();
    if int_part == 0.0 {
        int_digits.push('0');
    }
    while int_part >= 1.0 {
        let d = (int_part % radix as f64) as u32;
        int_digits.push(digit_char(d));
        int_part = (int_part / radix as f64).trunc();
    }
    int_digits.reverse();

    let mut out: String = int_digits.into_iter().collect();
    if frac > 0.0 {
        out.push('.');
        for _ in 0..20 {
            frac *= radix as f64;
            let d = frac.trunc() as u32;
            out.push(digit_char(d));
            frac -= d as f64;
            if frac <= 0.0 {
                break;
            }
        }
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

/// Number.prototype.toString
fn number_to_string_method(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let n = this_number(&this, "toString")?;
    let radix = match arg(&args, 0) {
        TracedValue::Undefined => 10.0,
        v => to_integer_or_infinity(&v),
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(EvalError::RangeError(
            "toString() radix must be between 2 and 36".to_string(),
        ));
    }
    if radix == 10.0 {
        return Ok(TracedValue::String(number_to_string(n)));
    }
    Ok(TracedValue::String(to_radix_string(n, radix as u32)))
}

/// Number.prototype.valueOf
fn number_value_of(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Number(this_number(&this, "valueOf")?))
}

/// Number.isInteger
fn number_is_integer(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Boolean(match arg(&args, 0) {
        TracedValue::Number(n) => n.is_finite() && n.trunc() == n,
        _ => false,
    }))
}

/// Number.isFinite
fn number_is_finite(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Boolean(matches!(
        arg(&args, 0),
        TracedValue::Number(n) if n.is_finite()
    )))
}

/// Number.isNaN
fn number_is_nan(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Boolean(matches!(
        arg(&args, 0),
        TracedValue::Number(n) if n.is_nan()
    )))
}

/// Longest prefix of `s` that parses as a decimal number.
fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    for (prefix, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if s.starts_with(prefix) {
            return value;
        }
    }
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut best = f64::NAN;
    for (idx, c) in s.char_indices() {
        let accept = match c {
            '0'..='9' => true,
            '+' | '-' => idx == 0 || s[..idx].ends_with(['e', 'E']),
            '.' if !seen_dot && !seen_exp => {
                seen_dot = true;
                true
            }
            'e' | 'E' if !seen_exp && idx > 0 => {
                seen_exp = true;
                true
            }
            _ => false,
        };
        if !accept {
            break;
        }
        end = idx + c.len_utf8();
        if let Ok(v) = s[..end].parse::<f64>() {
            best = v;
        }
    }
    if end == 0 {
        f64::NAN
    } else {
        best
    }
}

/// Number.parseFloat
fn number_parse_float(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::Number(parse_float_prefix(&to_js_string(
        &arg(&args, 0),
    ))))
}

/// Number.parseInt
fn number_parse_int(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let text = to_js_string(&arg(&args, 0));
    let mut s = text.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    let mut radix = match arg(&args, 1) {
        TracedValue::Undefined => 0,
        v => to_integer_or_infinity(&v) as u32,
    };
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return Ok(TracedValue::Number(f64::NAN));
    }
    let mut value: Option<f64> = None;
    for c in s.chars() {
        match c.to_digit(radix) {
            Some(d) => value = Some(value.unwrap_or(0.0) * radix as f64 + d as f64),
            None => break,
        }
    }
    Ok(TracedValue::Number(value.map_or(f64::NAN, |v| sign * v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_fixed_pads_decimals() {
        let mut ctx = EvalContext::with_core();
        let r = number_to_fixed(&mut ctx, 1.5.into(), vec![2.into()]).unwrap();
        assert_eq!(r, "1.50".into());
    }

    #[test]
    fn to_string_in_other_radix() {
        let mut ctx = EvalContext::with_core();
        let r = number_to_string_method(&mut ctx, 255.into(), vec![16.into()]).unwrap();
        assert_eq!(r, "ff".into());
        let r = number_to_string_method(&mut ctx, 0.5.into(), vec![2.into()]).unwrap();
        assert_eq!(r, "0.1".into());
    }

    #[test]
    fn parse_helpers() {
        let mut ctx = EvalContext::with_core();
        let r = number_parse_int(&mut ctx, TracedValue::Undefined, vec!["42px".into()]).unwrap();
        assert_eq!(r, 42.into());
        let r = number_parse_int(&mut ctx, TracedValue::Undefined, vec!["0x1f".into()]).unwrap();
        assert_eq!(r, 31.into());
        let r = number_parse_float(&mut ctx, TracedValue::Undefined, vec!["3.25abc".into()])
            .unwrap();
        assert_eq!(r, 3.25.into());
        assert_eq!(parse_float_prefix("1e3x"), 1000.0);
        assert!(parse_float_prefix("abc").is_nan());
    }
}
