use crate::parser::ast::Position;

/// Maps byte offsets of a script to 1-based lines and 0-based character columns.
pub struct LineIndex<'a> {
    script: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(script: &'a str) -> Self {
        let mut line_starts = vec![0];
        let mut iter = script.char_indices().peekable();
        while let Some((idx, c)) = iter.next() {
            match c {
                '\r' => {
                    if let Some((_, '\n')) = iter.peek() {
                        continue;
                    }
                    line_starts.push(idx + c.len_utf8());
                }
                '\n' | '\u{2028}' | '\u{2029}' => line_starts.push(idx + c.len_utf8()),
                _ => {}
            }
        }
        LineIndex {
            script,
            line_starts,
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let column = self
            .script
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - line_start);
        Position::new(line_idx + 1, column)
    }
}

/// Resolves the escape sequences in the body of a string literal.
pub fn unescape_string_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('v') => out.push('\u{000B}'),
            Some('0') if !matches!(chars.peek(), Some(d) if d.is_ascii_digit()) => {
                out.push('\0')
            }
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_unit(&mut out, &hex, 'x');
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_unit(&mut out, &hex, 'u');
            }
            // Line continuation
            Some('\n') | Some('\u{2028}') | Some('\u{2029}') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_unit(out: &mut String, hex: &str, escape: char) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => {
            out.push('\\');
            out.push(escape);
            out.push_str(hex);
        }
    }
}

/// Numeric value of a `numeric_literal` token. Integers are kept apart from
/// floats when they carry no fraction or exponent and fit in an `i64`.
pub fn parse_numeric_literal(text: &str) -> Option<NumericValue> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return match i64::from_str_radix(hex, 16) {
            Ok(i) => Some(NumericValue::Integer(i)),
            Err(_) => u128::from_str_radix(hex, 16)
                .ok()
                .map(|v| NumericValue::Float(v as f64)),
        };
    }
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(i) = text.parse::<i64>() {
            return Some(NumericValue::Integer(i));
        }
    }
    text.parse::<f64>().ok().map(NumericValue::Float)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Integer(i64),
    Float(f64),
}
