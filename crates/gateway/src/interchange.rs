//! Lossy conversion of the JSON export back into [`Value`]
//!
//! JSON cannot tell `42` from `42.0` and has no enum variants. Whole numbers
//! in `i64` range become `Int`, every other number becomes `Float`, and enums
//! come back as whatever shape the evaluator's export gave them. Object
//! fields keep the order the evaluator printed them in.

use nickel_bridge_core::{Result, Value};

pub fn from_json_str(text: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json(json))
}

pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::number),
        },
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(fields) => Value::Record(
            fields
                .into_iter()
                .map(|(key, value)| (key, from_json(value)))
                .collect(),
        ),
    }
}
