//! Serialization of resolved values.
//!
//! Two targets are supported:
//!
//! - **Strict JSON** via [`to_json()`] and [`to_json_pretty()`]. Non-finite
//!   numbers become `null` and BigInts are written as plain integer digits.
//! - **JSON5** via [`to_json5()`], shaped by [`StringifyOptions`]: unquoted
//!   identifier keys, `Infinity`/`NaN`, and the BigInt `n` suffix when the
//!   target edition has it.
//!
//! Object keys are written in insertion order.
//!
//! # Examples
//!
//! ```
//! use refjson::{parse, StringifyOptions};
//! use refjson::stringify::{to_json, to_json5};
//!
//! let value = parse("{name: 'web', port: 0x1F90, ratio: Infinity}").unwrap();
//!
//! assert_eq!(to_json(&value), r#"{"name":"web","port":8080,"ratio":null}"#);
//! assert_eq!(
//!     to_json5(&value, &StringifyOptions::default()),
//!     r#"{name:"web",port:8080,ratio:Infinity}"#
//! );
//! ```

use std::sync::LazyLock;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use regex::Regex;

use crate::{
    edition::{DEFAULT_EDITION, Edition},
    value::{Map, Value, format_number},
};

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").ok());

/// Whether `key` can be written without quotes in JSON5 output.
pub fn is_identifier_key(key: &str) -> bool {
    IDENTIFIER
        .as_ref()
        .is_some_and(|identifier| identifier.is_match(key))
}

/// Shape of JSON5 output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Spaces per nesting level; `0` writes everything on one line
    pub indent: usize,
    /// `"` or `'`
    pub quote: char,
    /// Target edition year; decides whether BigInts keep their `n` suffix
    pub edition: i64,
    /// Quote every key, even identifiers
    pub quote_keys: bool,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        StringifyOptions {
            indent: 0,
            quote: '"',
            edition: DEFAULT_EDITION,
            quote_keys: false,
        }
    }
}

impl StringifyOptions {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = if quote == '\'' { '\'' } else { '"' };
        self
    }

    pub fn with_edition(mut self, edition: i64) -> Self {
        self.edition = edition;
        self
    }

    pub fn with_quote_keys(mut self, quote_keys: bool) -> Self {
        self.quote_keys = quote_keys;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Json,
    Json5 { bigint: bool, quote_keys: bool },
}

pub struct Printer {
    target: Target,
    indent: String,
    quote: char,
}

impl Printer {
    /// Strict JSON printer; `pretty` indents by two spaces.
    pub fn json(pretty: bool) -> Self {
        Printer {
            target: Target::Json,
            indent: if pretty { "  ".to_string() } else { String::new() },
            quote: '"',
        }
    }

    pub fn json5(options: &StringifyOptions) -> Self {
        Printer {
            target: Target::Json5 {
                bigint: Edition::resolve(options.edition).features().bigint,
                quote_keys: options.quote_keys,
            },
            indent: " ".repeat(options.indent),
            quote: options.quote,
        }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut out = String::new();
        self.print_value(value, 0, &mut out);
        out
    }

    fn pretty(&self) -> bool {
        !self.indent.is_empty()
    }

    fn print_value(&self, value: &Value, level: usize, out: &mut String) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.print_number(*n, out),
            Value::BigInt(n) => self.print_bigint(n, out),
            Value::String(s) => self.print_string(s, out),
            Value::Array(items) => self.print_array(items, level, out),
            Value::Object(map) => self.print_object(map, level, out),
        }
    }

    fn print_number(&self, n: f64, out: &mut String) {
        if !n.is_finite() && self.target == Target::Json {
            out.push_str("null");
        } else {
            out.push_str(&format_number(n));
        }
    }

    fn print_bigint(&self, n: &BigInt, out: &mut String) {
        match self.target {
            Target::Json => out.push_str(&n.to_string()),
            Target::Json5 { bigint: true, .. } => {
                out.push_str(&n.to_string());
                out.push('n');
            }
            Target::Json5 { bigint: false, .. } => {
                if is_exact_double(n) {
                    out.push_str(&n.to_string());
                } else {
                    self.print_string(&n.to_string(), out);
                }
            }
        }
    }

    fn print_array(&self, items: &[Value], level: usize, out: &mut String) {
        if items.is_empty() {
            out.push_str("[]");
            return;
        }

        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.newline(level + 1, out);
            self.print_value(item, level + 1, out);
        }
        self.newline(level, out);
        out.push(']');
    }

    fn print_object(&self, map: &Map, level: usize, out: &mut String) {
        if map.is_empty() {
            out.push_str("{}");
            return;
        }

        out.push('{');
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.newline(level + 1, out);
            self.print_key(key, out);
            out.push(':');
            if self.pretty() {
                out.push(' ');
            }
            self.print_value(value, level + 1, out);
        }
        self.newline(level, out);
        out.push('}');
    }

    fn print_key(&self, key: &str, out: &mut String) {
        match self.target {
            Target::Json5 {
                quote_keys: false, ..
            } if is_identifier_key(key) => out.push_str(key),
            _ => self.print_string(key, out),
        }
    }

    fn newline(&self, level: usize, out: &mut String) {
        if self.pretty() {
            out.push('\n');
            for _ in 0..level {
                out.push_str(&self.indent);
            }
        }
    }

    fn print_string(&self, s: &str, out: &mut String) {
        out.push(self.quote);
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                c if c == self.quote => {
                    out.push('\\');
                    out.push(c);
                }
                // JSON5 readers treat these as line terminators
                '\u{2028}' | '\u{2029}' if self.target != Target::Json => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
                c => out.push(c),
            }
        }
        out.push(self.quote);
    }
}

fn is_exact_double(n: &BigInt) -> bool {
    n.to_f64()
        .and_then(BigInt::from_f64)
        .is_some_and(|round_trip| &round_trip == n)
}

/// Compact strict JSON.
pub fn to_json(value: &Value) -> String {
    Printer::json(false).print(value)
}

/// Strict JSON with two-space indentation.
///
/// ```
/// use refjson::{parse, to_json_pretty};
///
/// let value = parse("{a: [1, 2]}").unwrap();
/// assert_eq!(to_json_pretty(&value), "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    Printer::json(true).print(value)
}

/// JSON5 text shaped by `options`.
pub fn to_json5(value: &Value, options: &StringifyOptions) -> String {
    Printer::json5(options).print(value)
}

/// Convert to a `serde_json` value, with the same number rules as [`to_json`].
pub fn to_serde_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => number_to_serde(*n),
        Value::BigInt(n) => n
            .to_i64()
            .map(|i| serde_json::Value::Number(i.into()))
            .or_else(|| n.to_u64().map(|u| serde_json::Value::Number(u.into())))
            .unwrap_or_else(|| serde_json::Value::String(n.to_string())),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_serde_json).collect()),
        Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), to_serde_json(value)))
                .collect(),
        ),
    }
}

fn number_to_serde(n: f64) -> serde_json::Value {
    // Integral values keep an integer representation
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number((n as i64).into());
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Convert from a `serde_json` value. Integers outside the safe range become
/// BigInts.
pub fn from_serde_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i.unsigned_abs() > 9_007_199_254_740_991 {
                    Value::BigInt(BigInt::from(i))
                } else {
                    Value::Number(i as f64)
                }
            } else if let Some(u) = n.as_u64() {
                Value::BigInt(BigInt::from(u))
            } else {
                n.as_f64().map_or(Value::Null, Value::Number)
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_serde_json).collect())
        }
        serde_json::Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, from_serde_json(value)))
                .collect(),
        ),
    }
}
