use serde::Serialize;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// A coerced, typed parameter value.
///
/// Serializes to the normalized raw form, so feeding the serialized value
/// back through coercion with the same define yields the same value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value.
    Int(i64),
    /// Finite float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    String(String),
    /// Enum value (a key of the define's mapping).
    Enum(i64),
    /// Array of element values.
    Array(Vec<ParamValue>),
    /// Struct members that were present and non-null.
    Struct(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Converts back into an untyped JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Int(v) | ParamValue::Enum(v) => Value::Number((*v).into()),
            // Coercion only admits finite floats.
            ParamValue::Float(v) => Number::from_f64(*v).map(Value::Number).unwrap_or(Value::Null),
            ParamValue::Bool(v) => Value::Bool(*v),
            ParamValue::String(v) => Value::String(v.clone()),
            ParamValue::Array(items) => Value::Array(items.iter().map(ParamValue::to_json).collect()),
            ParamValue::Struct(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Returns the integer payload of `Int` and `Enum` values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) | ParamValue::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) | ParamValue::Enum(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(v) => Some(v),
            _ => None,
        }
    }
}
