//! Canonical text encoding.
//!
//! The canonical form of a value is pretty-printed JSON with a four-space
//! indent. Mapping keys keep their order (nodes emit `"type"` first, then
//! fields in declaration order). Arrays are replaced by their marker, complex
//! numbers become `{"real": .., "imag": ..}` and non-finite floats become the
//! sentinels `"Infinity"`, `"-Infinity"` and `"NaN"`.
//!
//! Decoding goes the other way in two steps: text to an untyped [`Value`]
//! (markers and sentinels stay strings), then [`FromValue`] on the target
//! type, which reverses the sentinels and complex encoding.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::address::Address;
use crate::error::Result;
use crate::value::{FromValue, Map, Value};

pub const INFINITY: &str = "Infinity";
pub const NEG_INFINITY: &str = "-Infinity";
pub const NAN: &str = "NaN";

/// Indent of the canonical form.
pub const CANONICAL_INDENT: usize = 4;

/// Encode a float, mapping non-finite values to their sentinels.
pub fn encode_float(value: f64) -> JsonValue {
    match Number::from_f64(value) {
        Some(number) => JsonValue::Number(number),
        None if value.is_nan() => JsonValue::String(NAN.to_string()),
        None if value > 0.0 => JsonValue::String(INFINITY.to_string()),
        None => JsonValue::String(NEG_INFINITY.to_string()),
    }
}

/// Reverse a non-finite float sentinel.
pub fn parse_float_sentinel(text: &str) -> Option<f64> {
    match text {
        INFINITY => Some(f64::INFINITY),
        NEG_INFINITY => Some(f64::NEG_INFINITY),
        NAN => Some(f64::NAN),
        _ => None,
    }
}

/// Lower a value to JSON, substituting markers for arrays.
pub fn to_json_value(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(flag) => JsonValue::Bool(*flag),
        Value::Int(number) => JsonValue::Number((*number).into()),
        Value::Float(number) => encode_float(*number),
        Value::Complex(number) => {
            let mut parts = JsonMap::new();
            parts.insert("real".to_string(), encode_float(number.re));
            parts.insert("imag".to_string(), encode_float(number.im));
            JsonValue::Object(parts)
        }
        Value::Str(text) => JsonValue::String(text.clone()),
        Value::Array(array) => JsonValue::String(array.marker()),
        Value::Seq(items) => JsonValue::Array(items.iter().map(to_json_value).collect()),
        Value::Map(map) => JsonValue::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), to_json_value(item)))
                .collect(),
        ),
    }
}

/// Convert one JSON scalar; `None` for arrays and objects.
pub fn scalar_from_json(json: &JsonValue) -> Option<Value> {
    Some(match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(flag) => Value::Bool(*flag),
        JsonValue::Number(number) => match number.as_i64() {
            Some(int) => Value::Int(int),
            None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(text) => Value::Str(text.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => return None,
    })
}

/// Convert parsed JSON into an untyped value. Markers stay strings.
pub fn from_json_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Array(items) => Value::Seq(items.iter().map(from_json_value).collect()),
        JsonValue::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), from_json_value(item)))
                .collect::<Map>(),
        ),
        scalar => scalar_from_json(scalar).unwrap_or(Value::Null),
    }
}

/// Render JSON with the given indent width.
pub fn render_json(json: &JsonValue, indent: usize) -> String {
    let indent = vec![b' '; indent];
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
    // Writing a `serde_json::Value` into memory cannot fail: keys are strings
    // and numbers are finite by construction.
    if json.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

/// The canonical text of a value.
pub fn to_canonical_json(value: &Value) -> String {
    render_json(&to_json_value(value), CANONICAL_INDENT)
}

/// Render a value as YAML, with the same markers and sentinels as JSON.
pub fn to_yaml(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(&to_json_value(value))?)
}

/// Parse JSON text into an untyped value.
pub fn parse_json(text: &str) -> Result<Value> {
    let json: JsonValue = serde_json::from_str(text)?;
    Ok(from_json_value(&json))
}

/// Parse YAML text into an untyped value.
pub fn parse_yaml(text: &str) -> Result<Value> {
    let json: JsonValue = serde_yaml::from_str(text)?;
    Ok(from_json_value(&json))
}

/// Decode a typed value from canonical (or any JSON) text.
pub fn from_json_str<T: FromValue>(text: &str) -> Result<T> {
    T::from_value(parse_json(text)?, &Address::root())
}

/// Decode a typed value from YAML text.
pub fn from_yaml_str<T: FromValue>(text: &str) -> Result<T> {
    T::from_value(parse_yaml(text)?, &Address::root())
}
