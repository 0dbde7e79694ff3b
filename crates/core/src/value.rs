//! In-process representation of an evaluated configuration value
//!
//! A [`Value`] is an owned, acyclic tree. Every decode builds a fresh tree, so
//! nothing in it refers back to the buffer it was read from.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

// 2^63, the first f64 above i64::MAX
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Field map of a record. Keys are unique; equality ignores field order while
/// iteration keeps the order fields were decoded in.
pub type Record = IndexMap<String, Value>;

/// A fully evaluated value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Record(Record),
    /// A named variant with at most one payload
    Enum {
        tag: String,
        arg: Option<Box<Value>>,
    },
}

impl Value {
    /// Build a tagless enum variant
    pub fn tag(tag: impl Into<String>) -> Self {
        Value::Enum {
            tag: tag.into(),
            arg: None,
        }
    }

    /// Build an enum variant carrying a payload
    pub fn variant(tag: impl Into<String>, arg: Value) -> Self {
        Value::Enum {
            tag: tag.into(),
            arg: Some(Box::new(arg)),
        }
    }

    /// Build a record from `(key, value)` pairs; later duplicates win
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A number from a source with one numeric type: `Int` when whole and in
    /// `i64` range, `Float` otherwise
    pub fn number(n: f64) -> Self {
        if n.fract() == 0.0 && (-I64_UPPER_BOUND..I64_UPPER_BOUND).contains(&n) {
            Value::Int(n as i64)
        } else {
            Value::Float(n)
        }
    }

    /// Name of the variant, as used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Enum { .. } => "enum",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers are widened, floats are never narrowed
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// The tag and optional payload of an enum variant
    pub fn as_enum(&self) -> Option<(&str, Option<&Value>)> {
        match self {
            Value::Enum { tag, arg } => Some((tag, arg.as_deref())),
            _ => None,
        }
    }

    /// Look up a record field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record().and_then(|fields| fields.get(key))
    }

    /// Follow a path of record keys
    pub fn pointer<'a, I>(&self, path: I) -> Option<&Value>
    where
        I: IntoIterator<Item = &'a str>,
    {
        path.into_iter().try_fold(self, |current, key| current.get(key))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Record> for Value {
    fn from(fields: Record) -> Self {
        Value::Record(fields)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Renders values in the configuration language's surface syntax
///
/// Strings are escaped so the output reads back as the same string,
/// including `%{`, which would otherwise start an interpolation. Non-finite
/// floats have no surface form and print as `NaN`, `inf` and `-inf`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write_string(f, s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(fields) if fields.is_empty() => f.write_str("{}"),
            Value::Record(fields) => {
                f.write_str("{ ")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_label(f, key)?;
                    write!(f, " = {value}")?;
                }
                f.write_str(" }")
            }
            Value::Enum { tag, arg } => {
                f.write_str("'")?;
                write_label(f, tag)?;
                match arg.as_deref() {
                    None => Ok(()),
                    Some(arg @ Value::Enum { arg: Some(_), .. }) => write!(f, " ({arg})"),
                    Some(arg) => write!(f, " {arg}"),
                }
            }
        }
    }
}

fn write_label(f: &mut fmt::Formatter<'_>, label: &str) -> fmt::Result {
    let is_ident = label
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '\'');
    if is_ident {
        f.write_str(label)
    } else {
        write_string(f, label)
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '%' if chars.peek() == Some(&'{') => f.write_str("\\%")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// JSON-shaped serialization; enums become `{"tag": .., "arg": ..}`
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Enum { tag, arg } => {
                let len = if arg.is_some() { 2 } else { 1 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("tag", tag)?;
                if let Some(arg) = arg {
                    map.serialize_entry("arg", arg)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_equality_ignores_order() {
        let a = Value::record([("x", Value::Int(1)), ("y", Value::Int(2))]);
        let b = Value::record([("y", Value::Int(2)), ("x", Value::Int(1))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_int_and_float_are_distinct() {
        assert_ne!(Value::Int(42), Value::Float(42.0));
        assert_eq!(Value::Int(42).as_f64(), Some(42.0));
        assert_eq!(Value::Float(42.0).as_i64(), None);
    }

    #[test]
    fn test_number_bucketing() {
        assert_eq!(Value::number(42.0), Value::Int(42));
        assert_eq!(Value::number(-0.0), Value::Int(0));
        assert_eq!(Value::number(42.5), Value::Float(42.5));
        assert_eq!(Value::number(-9_223_372_036_854_775_808.0), Value::Int(i64::MIN));
        assert!(matches!(Value::number(9_223_372_036_854_775_808.0), Value::Float(_)));
        assert!(matches!(Value::number(f64::INFINITY), Value::Float(_)));
    }

    #[test]
    fn test_pointer_walks_nested_records() {
        let value = Value::record([(
            "a",
            Value::record([("b", Value::record([("c", Value::Int(7))]))]),
        )]);
        assert_eq!(value.pointer(["a", "b", "c"]), Some(&Value::Int(7)));
        assert_eq!(value.pointer(["a", "missing"]), None);
    }

    #[test]
    fn test_display_surface_syntax() {
        let value = Value::record([
            ("name", Value::from("web")),
            ("ports", Value::Array(vec![Value::Int(80), Value::Int(443)])),
            ("mode", Value::tag("Strict")),
            ("ratio", Value::Float(0.5)),
        ]);
        assert_eq!(
            value.to_string(),
            r#"{ name = "web", ports = [80, 443], mode = 'Strict, ratio = 0.5 }"#
        );
        assert_eq!(
            Value::variant("Some", Value::variant("Ok", Value::Int(-1))).to_string(),
            "'Some ('Ok -1)"
        );
        assert_eq!(Value::record([("has space", Value::Null)]).to_string(), r#"{ "has space" = null }"#);
    }

    #[test]
    fn test_display_escapes_strings() {
        assert_eq!(Value::from("50%{x}").to_string(), r#""50\%{x}""#);
        assert_eq!(Value::from("100%").to_string(), r#""100%""#);
        assert_eq!(Value::from("a\"b\\c").to_string(), r#""a\"b\\c""#);
        assert_eq!(Value::from("line\nnext\t").to_string(), r#""line\nnext\t""#);
        assert_eq!(Value::from("héllo").to_string(), r#""héllo""#);
        assert_eq!(Value::tag("a%{b}").to_string(), r#"'"a\%{b}""#);
    }

    #[test]
    fn test_display_non_finite_floats() {
        assert_eq!(Value::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-inf");
    }

    #[test]
    fn test_serialize_to_json() {
        let value = Value::record([
            ("count", Value::Int(3)),
            ("status", Value::variant("Count", Value::Int(42))),
            ("flag", Value::tag("Off")),
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "count": 3,
                "status": { "tag": "Count", "arg": 42 },
                "flag": { "tag": "Off" }
            })
        );
    }
}
