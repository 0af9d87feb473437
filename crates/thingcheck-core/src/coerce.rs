//! Value coercion against a field define.
//!
//! [`coerce`] is a pure function of a raw JSON value and a [`Define`]. A raw
//! `null` yields `Ok(None)`: the value was not reported, which callers treat
//! as a skip or as a missing field depending on the category. Everything
//! else either converts into a [`ParamValue`] or fails with a
//! [`CoerceError`] describing what did not fit.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use thingcheck_schema::{DataType, Define, Pattern, StructField};

use crate::value::ParamValue;

/// Why a raw value does not satisfy its define.
#[derive(Debug, Error)]
pub enum CoerceError {
    /// The JSON kind cannot represent the declared type.
    #[error("expected {expected}, got {found}")]
    WrongType {
        /// Declared type.
        expected: DataType,
        /// JSON kind of the raw value.
        found: &'static str,
    },
    /// A string or number could not be read as a finite number.
    #[error("'{0}' is not a number")]
    NotANumber(String),
    /// A number has a fractional part or does not fit in 64 bits.
    #[error("{0} is not an integer")]
    NotAnInteger(String),
    /// A number lies outside the declared bounds.
    #[error("{value} is outside {bounds}")]
    OutOfRange {
        /// Offending value.
        value: String,
        /// Declared bounds, rendered as `[min, max]`.
        bounds: String,
    },
    /// A number other than 0 or 1 was given for a boolean.
    #[error("{0} is not a boolean")]
    NotABoolean(String),
    /// A string exceeds the declared length.
    #[error("length {len} exceeds max {max}")]
    TooLong {
        /// Character count of the value.
        len: usize,
        /// Declared maximum.
        max: usize,
    },
    /// A string does not match the declared pattern.
    #[error("'{value}' does not match pattern '{pattern}'")]
    PatternMismatch {
        /// Offending value.
        value: String,
        /// Declared pattern.
        pattern: String,
    },
    /// An enum value is not a key of the mapping.
    #[error("{0} is not an enum value")]
    UnknownEnumValue(i64),
    /// An array holds more elements than declared.
    #[error("{len} elements exceed max {max}")]
    TooManyElements {
        /// Element count.
        len: usize,
        /// Declared maximum.
        max: usize,
    },
    /// An array element is null.
    #[error("null element")]
    NullElement,
    /// An array element failed.
    #[error("element {index}: {source}")]
    Element {
        /// Element index.
        index: usize,
        /// Element failure.
        source: Box<CoerceError>,
    },
    /// A struct member failed.
    #[error("field {field}: {source}")]
    Field {
        /// Member identifier.
        field: String,
        /// Member failure.
        source: Box<CoerceError>,
    },
}

impl CoerceError {
    /// Path to the failing nested value, e.g. `location.tags[2]`; empty at top level.
    pub fn path(&self) -> String {
        match self {
            CoerceError::Element { index, source } => format!("[{index}]{}", source.path()),
            CoerceError::Field { field, source } => format!(".{field}{}", source.path()),
            _ => String::new(),
        }
    }

    /// The innermost failure.
    pub fn leaf(&self) -> &CoerceError {
        match self {
            CoerceError::Element { source, .. } | CoerceError::Field { source, .. } => {
                source.leaf()
            }
            other => other,
        }
    }
}

/// Coerces one raw value into a typed value per `define`.
///
/// Returns `Ok(None)` when the raw value is `null`.
pub fn coerce(raw: &Value, define: &Define) -> Result<Option<ParamValue>, CoerceError> {
    if raw.is_null() {
        return Ok(None);
    }

    let value = match define {
        Define::Int { min, max, .. } => {
            let v = to_i64(raw, DataType::Int)?;
            check_range(v, *min, *max)?;
            ParamValue::Int(v)
        }
        Define::Float { min, max, .. } => {
            let v = to_f64(raw)?;
            check_range(v, *min, *max)?;
            ParamValue::Float(v)
        }
        Define::Bool { .. } => ParamValue::Bool(to_bool(raw)?),
        Define::String { max, pattern } => {
            let Value::String(s) = raw else {
                return Err(wrong_type(DataType::String, raw));
            };
            if let Some(max) = max {
                let len = s.chars().count();
                if len > *max {
                    return Err(CoerceError::TooLong { len, max: *max });
                }
            }
            if let Some(pattern) = pattern {
                check_pattern(s, pattern)?;
            }
            ParamValue::String(s.clone())
        }
        Define::Enum { mapping } => {
            let v = to_i64(raw, DataType::Enum)?;
            if !mapping.contains_key(&v.to_string()) {
                return Err(CoerceError::UnknownEnumValue(v));
            }
            ParamValue::Enum(v)
        }
        Define::Array { array_info, max } => {
            let Value::Array(items) = raw else {
                return Err(wrong_type(DataType::Array, raw));
            };
            if let Some(max) = max {
                if items.len() > *max {
                    return Err(CoerceError::TooManyElements {
                        len: items.len(),
                        max: *max,
                    });
                }
            }
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match coerce(item, array_info) {
                    Ok(Some(v)) => out.push(v),
                    Ok(None) => {
                        return Err(CoerceError::Element {
                            index,
                            source: Box::new(CoerceError::NullElement),
                        })
                    }
                    Err(e) => {
                        return Err(CoerceError::Element {
                            index,
                            source: Box::new(e),
                        })
                    }
                }
            }
            ParamValue::Array(out)
        }
        Define::Struct { specs } => {
            let Value::Object(map) = raw else {
                return Err(wrong_type(DataType::Struct, raw));
            };
            ParamValue::Struct(coerce_struct(map, specs)?)
        }
    };

    Ok(Some(value))
}

fn coerce_struct(
    map: &Map<String, Value>,
    specs: &[StructField],
) -> Result<BTreeMap<String, ParamValue>, CoerceError> {
    let mut out = BTreeMap::new();
    for spec in specs {
        let Some(raw) = map.get(spec.identifier.as_str()) else {
            continue;
        };
        match coerce(raw, &spec.define) {
            Ok(Some(v)) => {
                out.insert(spec.identifier.to_string(), v);
            }
            Ok(None) => {}
            Err(e) => {
                return Err(CoerceError::Field {
                    field: spec.identifier.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }
    Ok(out)
}

fn json_kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(expected: DataType, raw: &Value) -> CoerceError {
    CoerceError::WrongType {
        expected,
        found: json_kind(raw),
    }
}

fn to_i64(raw: &Value, expected: DataType) -> Result<i64, CoerceError> {
    match raw {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(CoerceError::NotAnInteger(n.to_string())),
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().map_err(|_| {
                if trimmed.parse::<f64>().is_ok() {
                    CoerceError::NotAnInteger(s.clone())
                } else {
                    CoerceError::NotANumber(s.clone())
                }
            })
        }
        other => Err(wrong_type(expected, other)),
    }
}

fn to_f64(raw: &Value) -> Result<f64, CoerceError> {
    let v = match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CoerceError::NotANumber(n.to_string()))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CoerceError::NotANumber(s.clone()))?,
        other => return Err(wrong_type(DataType::Float, other)),
    };
    if !v.is_finite() {
        return Err(CoerceError::NotANumber(raw.to_string()));
    }
    Ok(v)
}

fn to_bool(raw: &Value) -> Result<bool, CoerceError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(CoerceError::NotABoolean(n.to_string())),
        },
        other => Err(wrong_type(DataType::Bool, other)),
    }
}

fn check_range<T>(value: T, min: Option<T>, max: Option<T>) -> Result<(), CoerceError>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    let below = min.is_some_and(|lo| value < lo);
    let above = max.is_some_and(|hi| value > hi);
    if below || above {
        let render = |bound: Option<T>, open: &str| {
            bound.map_or_else(|| open.to_string(), |b| b.to_string())
        };
        return Err(CoerceError::OutOfRange {
            value: value.to_string(),
            bounds: format!("[{}, {}]", render(min, "-inf"), render(max, "inf")),
        });
    }
    Ok(())
}

fn check_pattern(value: &str, pattern: &Pattern) -> Result<(), CoerceError> {
    if !pattern.is_match(value) {
        return Err(CoerceError::PatternMismatch {
            value: value.to_string(),
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn out_of_range_renders_open_bounds() {
        let define = Define::Int {
            min: Some(0),
            max: None,
            step: None,
            unit: None,
        };
        let err = coerce(&json!(-1), &define).unwrap_err();
        assert_eq!(err.to_string(), "-1 is outside [0, inf]");
    }

    #[test]
    fn nested_path_points_at_leaf() {
        let define = Define::structure([("tags", Define::array(Define::string(Some(3))))]);
        let err = coerce(&json!({ "tags": ["ab", "abcd"] }), &define).unwrap_err();
        assert_eq!(err.path(), ".tags[1]");
        assert!(matches!(err.leaf(), CoerceError::TooLong { len: 4, max: 3 }));
    }

    #[test]
    fn integral_float_is_accepted_as_int() {
        assert_eq!(
            coerce(&json!(42.0), &Define::int()).unwrap(),
            Some(ParamValue::Int(42))
        );
        assert!(matches!(
            coerce(&json!(42.5), &Define::int()).unwrap_err(),
            CoerceError::NotAnInteger(_)
        ));
    }
}
