use indexmap::IndexMap;
use num_bigint::BigInt;

/// Ordered object map. Keys keep the order they were first written in.
pub type Map = IndexMap<String, Value>;

/// A fully resolved document value.
///
/// Numbers are IEEE doubles, as in JSON5; integers that do not fit exactly
/// are carried as [`Value::BigInt`].
///
/// # Examples
///
/// ```
/// use refjson::{Map, Value};
///
/// // Scalar values
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let number = Value::Number(42.0);
/// let string = Value::String("hello".to_string());
///
/// // Collections
/// let array = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
///
/// let mut obj = Map::new();
/// obj.insert("key".to_string(), Value::String("value".to_string()));
/// let object = Value::Object(obj);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,

    Boolean(bool),

    /// Double-precision number, including `Infinity` and `NaN`
    Number(f64),

    /// Arbitrary-precision integer
    BigInt(BigInt),

    String(String),

    Array(Vec<Value>),

    /// Object in insertion order; a repeated key keeps its first position and
    /// its last value
    Object(Map),
}

impl Value {
    /// Human-readable type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Field of an object; `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Follow a chain of object keys.
    ///
    /// ```
    /// use refjson::parse;
    ///
    /// let doc = parse("{a: {b: {c: 1}}}").unwrap();
    /// assert_eq!(doc.get_path(&["a", "b", "c"]).and_then(|v| v.as_f64()), Some(1.0));
    /// ```
    pub fn get_path(&self, segments: &[&str]) -> Option<&Value> {
        segments
            .iter()
            .try_fold(self, |current, segment| current.get(segment))
    }

    /// String form used by template interpolation.
    ///
    /// Matches JavaScript's `String(value)`: numbers print in their shortest
    /// form, arrays join their elements with commas, objects print as
    /// `[object Object]`.
    pub fn coerce_to_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => other.coerce_to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::BigInt(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

/// Format a number the way JavaScript's `Number.prototype.toString` does.
///
/// ```
/// use refjson::value::format_number;
///
/// assert_eq!(format_number(8080.0), "8080");
/// assert_eq!(format_number(0.1), "0.1");
/// assert_eq!(format_number(1e21), "1e+21");
/// assert_eq!(format_number(1.5e-7), "1.5e-7");
/// assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
/// ```
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // Shortest round-trip digits, e.g. "1.2345e3"
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let count = digits.len() as i32;
    let sign = if n < 0.0 { "-" } else { "" };

    let body = if (-7 < exponent) && (exponent < 21) {
        if exponent >= count - 1 {
            // Integer: pad with zeros
            format!("{}{}", digits, "0".repeat((exponent - count + 1) as usize))
        } else if exponent >= 0 {
            let split = (exponent + 1) as usize;
            format!("{}.{}", &digits[..split], &digits[split..])
        } else {
            format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
        }
    } else {
        let exponent_sign = if exponent < 0 { "-" } else { "+" };
        if count == 1 {
            format!("{}e{}{}", digits, exponent_sign, exponent.abs())
        } else {
            format!(
                "{}.{}e{}{}",
                &digits[..1],
                &digits[1..],
                exponent_sign,
                exponent.abs()
            )
        }
    };

    format!("{}{}", sign, body)
}
