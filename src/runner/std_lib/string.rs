//! String built-in.
//!
//! Provides String constructor and prototype methods. Positions and lengths
//! count characters.

use super::{arg, relative_index};
use crate::runner::builtins::registry::BuiltInRegistry;
use crate::runner::builtins::types::{BuiltInObject, EvalContext};
use crate::runner::ds::error::EvalError;
use crate::runner::ds::operations::type_conversion::{
    to_integer_or_infinity, to_js_string, to_number,
};
use crate::runner::ds::value::TracedValue;

/// Register the String built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let string = BuiltInObject::new("String")
        .with_constructor(string_constructor)
        .add_method("charAt", string_char_at)
        .add_method("charCodeAt", string_char_code_at)
        .add_method("indexOf", string_index_of)
        .add_method("lastIndexOf", string_last_index_of)
        .add_method("includes", string_includes)
        .add_method("startsWith", string_starts_with)
        .add_method("endsWith", string_ends_with)
        .add_method("slice", string_slice)
        .add_method("substring", string_substring)
        .add_method("substr", string_substr)
        .add_method("toUpperCase", string_to_upper_case)
        .add_method("toLowerCase", string_to_lower_case)
        .add_method("trim", string_trim)
        .add_method("trimStart", string_trim_start)
        .add_method("trimEnd", string_trim_end)
        .add_method("split", string_split)
        .add_method("concat", string_concat)
        .add_method("replace", string_replace)
        .add_method("replaceAll", string_replace_all)
        .add_method("repeat", string_repeat)
        .add_method("padStart", string_pad_start)
        .add_method("padEnd", string_pad_end)
        .add_method("toString", string_to_string)
        .add_method("valueOf", string_to_string)
        .add_static_method("fromCharCode", string_from_char_code);

    registry.register_object(string);
}

fn chars_of(value: &TracedValue) -> Vec<char> {
    to_js_string(value).chars().collect()
}

fn find_from(hay: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(hay.len()));
    }
    if needle.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()] == *needle)
}

fn rfind_from(hay: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    let last_start = (hay.len() - needle.len()).min(from);
    (0..=last_start)
        .rev()
        .find(|&i| hay[i..i + needle.len()] == *needle)
}

fn string_result(chars: &[char]) -> TracedValue {
    TracedValue::String(chars.iter().collect())
}

/// String constructor.
fn string_constructor(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(match args.first() {
        None => TracedValue::String(String::new()),
        Some(v) => TracedValue::String(to_js_string(v)),
    })
}

/// String.fromCharCode
fn string_from_char_code(
    _ctx: &mut EvalContext,
    _this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let units: Vec<u16> = args
        .iter()
        .map(|v| to_number(v) as i64 as u16)
        .collect();
    Ok(TracedValue::String(String::from_utf16_lossy(&units)))
}

/// String.prototype.toString
fn string_to_string(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(to_js_string(&this)))
}

/// String.prototype.charAt
fn string_char_at(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let index = to_integer_or_infinity(&arg(&args, 0));
    if index < 0.0 || index >= chars.len() as f64 {
        return Ok(TracedValue::String(String::new()));
    }
    Ok(TracedValue::String(chars[index as usize].to_string()))
}

/// String.prototype.charCodeAt
fn string_char_code_at(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let index = to_integer_or_infinity(&arg(&args, 0));
    if index < 0.0 || index >= chars.len() as f64 {
        return Ok(TracedValue::Number(f64::NAN));
    }
    let mut buf = [0u16; 2];
    let unit = chars[index as usize].encode_utf16(&mut buf)[0];
    Ok(TracedValue::Number(unit as f64))
}

/// String.prototype.indexOf
fn string_index_of(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let needle = chars_of(&arg(&args, 0));
    let from = to_integer_or_infinity(&arg(&args, 1)).max(0.0).min(chars.len() as f64) as usize;
    Ok(TracedValue::Number(
        find_from(&chars, &needle, from).map_or(-1.0, |i| i as f64),
    ))
}

/// String.prototype.lastIndexOf
fn string_last_index_of(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let needle = chars_of(&arg(&args, 0));
    let from = match args.get(1) {
        None | Some(TracedValue::Undefined) => chars.len(),
        Some(v) => {
            let n = to_number(v);
            if n.is_nan() {
                chars.len()
            } else {
                n.max(0.0) as usize
            }
        }
    };
    Ok(TracedValue::Number(
        rfind_from(&chars, &needle, from).map_or(-1.0, |i| i as f64),
    ))
}

/// String.prototype.includes
fn string_includes(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let needle = chars_of(&arg(&args, 0));
    let from = to_integer_or_infinity(&arg(&args, 1)).max(0.0).min(chars.len() as f64) as usize;
    Ok(TracedValue::Boolean(
        find_from(&chars, &needle, from).is_some(),
    ))
}

/// String.prototype.startsWith
fn string_starts_with(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let needle = chars_of(&arg(&args, 0));
    let pos = to_integer_or_infinity(&arg(&args, 1)).max(0.0).min(chars.len() as f64) as usize;
    Ok(TracedValue::Boolean(chars[pos..].starts_with(&needle)))
}

/// String.prototype.endsWith
fn string_ends_with(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let needle = chars_of(&arg(&args, 0));
    let end = relative_index(args.get(1), chars.len(), chars.len());
    Ok(TracedValue::Boolean(chars[..end].ends_with(&needle)))
}

/// String.prototype.slice
fn string_slice(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let start = relative_index(args.first(), chars.len(), 0);
    let end = relative_index(args.get(1), chars.len(), chars.len());
    if start >= end {
        return Ok(TracedValue::String(String::new()));
    }
    Ok(string_result(&chars[start..end]))
}

/// String.prototype.substring
fn string_substring(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let len = chars.len() as f64;
    let clamp = |v: &TracedValue| to_integer_or_infinity(v).max(0.0).min(len) as usize;
    let start = clamp(&arg(&args, 0));
    let end = match args.get(1) {
        None | Some(TracedValue::Undefined) => chars.len(),
        Some(v) => clamp(v),
    };
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(string_result(&chars[from..to]))
}

/// String.prototype.substr
fn string_substr(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let chars = chars_of(&this);
    let start = relative_index(args.first(), chars.len(), 0);
    let length = match args.get(1) {
        None | Some(TracedValue::Undefined) => chars.len() - start,
        Some(v) => (to_integer_or_infinity(v).max(0.0) as usize).min(chars.len() - start),
    };
    Ok(string_result(&chars[start..start + length]))
}

/// String.prototype.toUpperCase
fn string_to_upper_case(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(to_js_string(&this).to_uppercase()))
}

/// String.prototype.toLowerCase
fn string_to_lower_case(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(to_js_string(&this).to_lowercase()))
}

/// String.prototype.trim
fn string_trim(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(to_js_string(&this).trim().to_string()))
}

/// String.prototype.trimStart
fn string_trim_start(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(
        to_js_string(&this).trim_start().to_string(),
    ))
}

/// String.prototype.trimEnd
fn string_trim_end(
    _ctx: &mut EvalContext,
    this: TracedValue,
    _args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    Ok(TracedValue::String(to_js_string(&this).trim_end().to_string()))
}

/// String.prototype.split
fn string_split(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let s = to_js_string(&this);
    let limit = match args.get(1) {
        None | Some(TracedValue::Undefined) => usize::MAX,
        Some(v) => to_number(v).max(0.0) as usize,
    };
    let parts: Vec<TracedValue> = match arg(&args, 0) {
        TracedValue::Undefined => vec![TracedValue::String(s)],
        separator => {
            let separator = to_js_string(&separator);
            if separator.is_empty() {
                s.chars().map(|c| TracedValue::String(c.to_string())).collect()
            } else {
                s.split(separator.as_str())
                    .map(|part| TracedValue::String(part.to_string()))
                    .collect()
            }
        }
    };
    Ok(TracedValue::new_array(
        parts.into_iter().take(limit).collect(),
    ))
}

/// String.prototype.concat
fn string_concat(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let mut s = to_js_string(&this);
    for value in &args {
        s.push_str(&to_js_string(value));
    }
    Ok(TracedValue::String(s))
}

fn replacement_for(
    ctx: &mut EvalContext,
    replacement: &TracedValue,
    matched: &str,
    offset: usize,
    whole: &str,
) -> Result<String, EvalError> {
    if replacement.is_callable() {
        let result = ctx.call_function(
            replacement,
            TracedValue::Undefined,
            vec![
                TracedValue::from(matched),
                TracedValue::Number(offset as f64),
                TracedValue::from(whole),
            ],
        )?;
        Ok(to_js_string(&result))
    } else {
        Ok(to_js_string(replacement).replace("$&", matched))
    }
}

fn replace_occurrences(
    ctx: &mut EvalContext,
    this: &TracedValue,
    args: &[TracedValue],
    all: bool,
) -> Result<TracedValue, EvalError> {
    let s = to_js_string(this);
    let pattern = to_js_string(&arg(args, 0));
    let replacement = arg(args, 1);
    let chars: Vec<char> = s.chars().collect();
    let needle: Vec<char> = pattern.chars().collect();

    let mut out = String::new();
    let mut pos = 0;
    while let Some(found) = find_from(&chars, &needle, pos) {
        out.extend(&chars[pos..found]);
        out.push_str(&replacement_for(ctx, &replacement, &pattern, found, &s)?);
        pos = found + needle.len();
        if !all {
            break;
        }
        if needle.is_empty() {
            // Empty pattern matches between every character.
            if pos >= chars.len() {
                break;
            }
            out.push(chars[pos]);
            pos += 1;
        }
    }
    out.extend(&chars[pos.min(chars.len())..]);
    Ok(TracedValue::String(out))
}

/// String.prototype.replace, string patterns only.
fn string_replace(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    replace_occurrences(ctx, &this, &args, false)
}

/// String.prototype.replaceAll, string patterns only.
fn string_replace_all(
    ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    replace_occurrences(ctx, &this, &args, true)
}

/// Longest string `repeat` and the padding methods will build, in chars.
const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

fn check_string_length(len: f64) -> Result<(), EvalError> {
    if len > MAX_STRING_LENGTH as f64 {
        return Err(EvalError::RangeError("Invalid string length".to_string()));
    }
    Ok(())
}

/// String.prototype.repeat
fn string_repeat(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let count = to_integer_or_infinity(&arg(&args, 0));
    if count < 0.0 || count.is_infinite() {
        return Err(EvalError::RangeError(format!(
            "Invalid count value: {}",
            count
        )));
    }
    let s = to_js_string(&this);
    if !s.is_empty() {
        check_string_length(s.chars().count() as f64 * count)?;
    }
    Ok(TracedValue::String(s.repeat(count as usize)))
}

fn padding(this: &TracedValue, args: &[TracedValue]) -> Result<(String, String), EvalError> {
    let s = to_js_string(this);
    let target = to_integer_or_infinity(&arg(args, 0)).max(0.0);
    let filler = match arg(args, 1) {
        TracedValue::Undefined => " ".to_string(),
        other => to_js_string(&other),
    };
    let current = s.chars().count();
    if target <= current as f64 || filler.is_empty() {
        return Ok((s, String::new()));
    }
    check_string_length(target)?;
    let pad: String = filler
        .chars()
        .cycle()
        .take(target as usize - current)
        .collect();
    Ok((s, pad))
}

/// String.prototype.padStart
fn string_pad_start(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let (s, pad) = padding(&this, &args)?;
    Ok(TracedValue::String(pad + &s))
}

/// String.prototype.padEnd
fn string_pad_end(
    _ctx: &mut EvalContext,
    this: TracedValue,
    args: Vec<TracedValue>,
) -> Result<TracedValue, EvalError> {
    let (s, pad) = padding(&this, &args)?;
    Ok(TracedValue::String(s + &pad))
}
