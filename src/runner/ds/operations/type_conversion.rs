use crate::runner::ds::value::TracedValue;

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_FUNCTION: &str = "function";

/// Result of the `typeof` operator.
pub fn get_type(v: &TracedValue) -> &'static str {
    match v {
        TracedValue::Undefined | TracedValue::Unresolved(_) => TYPE_STR_UNDEFINED,
        TracedValue::Null => TYPE_STR_OBJECT,
        TracedValue::Boolean(_) => TYPE_STR_BOOLEAN,
        TracedValue::Number(_) => TYPE_STR_NUMBER,
        TracedValue::String(_) => TYPE_STR_STRING,
        TracedValue::Array(_) | TracedValue::Object(_) | TracedValue::ScopeRef(_) => {
            TYPE_STR_OBJECT
        }
        TracedValue::Function(_) => TYPE_STR_FUNCTION,
    }
}

pub fn to_boolean(v: &TracedValue) -> bool {
    match v {
        TracedValue::Undefined | TracedValue::Null => false,
        TracedValue::Boolean(b) => *b,
        TracedValue::Number(n) => !(*n == 0.0 || n.is_nan()),
        TracedValue::String(s) => !s.is_empty(),
        TracedValue::Unresolved(name) => !name.is_empty(),
        TracedValue::Array(_)
        | TracedValue::Object(_)
        | TracedValue::Function(_)
        | TracedValue::ScopeRef(_) => true,
    }
}

/// Reduces heap values to the string primitive the host would produce.
/// Unresolved identifiers stand in for their own name.
pub fn to_primitive(v: &TracedValue) -> TracedValue {
    match v {
        TracedValue::Array(_)
        | TracedValue::Object(_)
        | TracedValue::Function(_)
        | TracedValue::ScopeRef(_) => TracedValue::String(to_js_string(v)),
        TracedValue::Unresolved(name) => TracedValue::String(name.clone()),
        _ => v.clone(),
    }
}

pub fn to_number(v: &TracedValue) -> f64 {
    match v {
        TracedValue::Undefined => f64::NAN,
        TracedValue::Null => 0.0,
        TracedValue::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        TracedValue::Number(n) => *n,
        TracedValue::String(s) => string_to_number(s),
        other => match to_primitive(other) {
            TracedValue::String(s) => string_to_number(&s),
            _ => f64::NAN,
        },
    }
}

pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for prefix in ["0x", "0X"] {
        if let Some(hex) = s.strip_prefix(prefix) {
            return u64::from_str_radix(hex, 16)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    let looks_numeric = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !looks_numeric {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// `ToIntegerOrInfinity`: NaN becomes 0, everything else is truncated.
pub fn to_integer_or_infinity(v: &TracedValue) -> f64 {
    let n = to_number(v);
    if n.is_nan() {
        0.0
    } else {
        n.trunc()
    }
}

pub fn to_int32(v: &TracedValue) -> i32 {
    let n = to_number(v);
    if !n.is_finite() {
        return 0;
    }
    let m = n.trunc().rem_euclid(4_294_967_296.0);
    if m >= 2_147_483_648.0 {
        (m - 4_294_967_296.0) as i32
    } else {
        m as i32
    }
}

pub fn to_js_string(v: &TracedValue) -> String {
    match v {
        TracedValue::Undefined => "undefined".to_string(),
        TracedValue::Null => "null".to_string(),
        TracedValue::Boolean(b) => b.to_string(),
        TracedValue::Number(n) => number_to_string(*n),
        TracedValue::String(s) => s.clone(),
        TracedValue::Unresolved(name) => name.clone(),
        TracedValue::Array(a) => {
            let items = match a.try_borrow() {
                Ok(items) => items,
                // Array reached through itself.
                Err(_) => return String::new(),
            };
            items
                .iter()
                .map(|item| {
                    if item.is_nullish() || item.same_identity(v) {
                        String::new()
                    } else {
                        to_js_string(item)
                    }
                })
                .collect::<Vec<_>>()
                .join(",")
        }
        TracedValue::Object(_) | TracedValue::ScopeRef(_) => "[object Object]".to_string(),
        TracedValue::Function(f) => format!("function {}() {{ [code] }}", f.name),
    }
}

/// `Number.prototype.toString()` with radix 10.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }
    // Shortest round-tripping digits and decimal exponent.
    let sci = format!("{:e}", n);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exponent + 1;

    if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let sign = if point - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (point - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (point - 1).abs())
        }
    }
}

/// Canonical string form of a property key.
pub fn to_property_key(v: &TracedValue) -> String {
    to_js_string(&to_primitive(v))
}
