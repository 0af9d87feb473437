use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::identifiers::Identifier;
use crate::model::SchemaError;

/// Type tag of a [`Define`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    String,
    /// Integer drawn from a fixed value set.
    Enum,
    /// Homogeneous array.
    Array,
    /// Object with declared member fields.
    Struct,
}

impl DataType {
    /// Returns the lowercase wire name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Enum => "enum",
            DataType::Array => "array",
            DataType::Struct => "struct",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type specification and constraints attached to one schema field.
///
/// Serialized with an internal `"type"` tag, e.g.
/// `{"type":"int","min":0,"max":100,"unit":"C"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Define {
    /// Integer with optional inclusive bounds.
    Int {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        /// Display step; not enforced.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<i64>,
        /// Display unit.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// Float with optional inclusive bounds.
    Float {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        /// Display step; not enforced.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
        /// Display unit.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// Boolean; the mapping names the `"0"`/`"1"` states for display.
    Bool {
        /// Display names keyed by `"0"` and `"1"`.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        mapping: BTreeMap<String, String>,
    },
    /// String with optional length and pattern constraints.
    String {
        /// Maximum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
        /// Regular expression the whole value must match.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<Pattern>,
    },
    /// Enumeration; only mapping keys are accepted.
    ///
    /// Keys are decimal integers kept as strings, the form they take in a
    /// JSON object.
    Enum {
        /// Accepted values and their display names.
        mapping: BTreeMap<String, String>,
    },
    /// Array whose elements all follow `array_info`.
    Array {
        /// Element definition.
        #[serde(rename = "arrayInfo")]
        array_info: Box<Define>,
        /// Maximum element count.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// Object with declared members.
    Struct {
        /// Member fields.
        specs: Vec<StructField>,
    },
}

/// A string constraint compiled once, when the define is built.
///
/// The source is matched against the whole value; it serializes back to
/// the source text as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source`, anchored at both ends.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source, regex })
    }

    /// The pattern as authored.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the whole of `value` matches.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for Pattern {
    type Error = String;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(source.as_str()).map_err(|e| format!("invalid pattern '{source}': {e}"))
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One member of a struct [`Define`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    /// Member identifier (key in the raw object).
    pub identifier: Identifier,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Member type definition.
    #[serde(rename = "dataType")]
    pub define: Define,
}

impl Define {
    /// Returns the type tag.
    pub fn data_type(&self) -> DataType {
        match self {
            Define::Int { .. } => DataType::Int,
            Define::Float { .. } => DataType::Float,
            Define::Bool { .. } => DataType::Bool,
            Define::String { .. } => DataType::String,
            Define::Enum { .. } => DataType::Enum,
            Define::Array { .. } => DataType::Array,
            Define::Struct { .. } => DataType::Struct,
        }
    }

    /// Unconstrained integer define.
    pub fn int() -> Self {
        Define::Int {
            min: None,
            max: None,
            step: None,
            unit: None,
        }
    }

    /// Integer define bounded to `[min, max]`.
    pub fn int_range(min: i64, max: i64) -> Self {
        Define::Int {
            min: Some(min),
            max: Some(max),
            step: None,
            unit: None,
        }
    }

    /// Unconstrained float define.
    pub fn float() -> Self {
        Define::Float {
            min: None,
            max: None,
            step: None,
            unit: None,
        }
    }

    /// Float define bounded to `[min, max]`.
    pub fn float_range(min: f64, max: f64) -> Self {
        Define::Float {
            min: Some(min),
            max: Some(max),
            step: None,
            unit: None,
        }
    }

    /// Boolean define without display mapping.
    pub fn bool() -> Self {
        Define::Bool {
            mapping: BTreeMap::new(),
        }
    }

    /// String define with an optional maximum length.
    pub fn string(max: Option<usize>) -> Self {
        Define::String { max, pattern: None }
    }

    /// String define whose values must match `pattern` in full.
    pub fn string_matching(max: Option<usize>, pattern: Pattern) -> Self {
        Define::String {
            max,
            pattern: Some(pattern),
        }
    }

    /// Enum define from `(value, name)` pairs.
    pub fn enumeration<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Define::Enum {
            mapping: items
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        }
    }

    /// Array define over `element`.
    pub fn array(element: Define) -> Self {
        Define::Array {
            array_info: Box::new(element),
            max: None,
        }
    }

    /// Struct define from `(identifier, define)` pairs.
    pub fn structure<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Define)>,
    {
        Define::Struct {
            specs: fields
                .into_iter()
                .map(|(id, define)| StructField {
                    identifier: Identifier::new(id),
                    name: id.to_string(),
                    define,
                })
                .collect(),
        }
    }

    /// Checks that the constraints are self-consistent.
    ///
    /// `path` names the field being checked and prefixes nested paths.
    pub fn check(&self, path: &str) -> Result<(), SchemaError> {
        match self {
            Define::Int { min, max, .. } => {
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(SchemaError::InvalidDefine {
                            path: path.to_string(),
                            reason: format!("min {lo} exceeds max {hi}"),
                        });
                    }
                }
                Ok(())
            }
            Define::Float { min, max, .. } => {
                for bound in [min, max].into_iter().flatten() {
                    if !bound.is_finite() {
                        return Err(SchemaError::InvalidDefine {
                            path: path.to_string(),
                            reason: format!("non-finite bound {bound}"),
                        });
                    }
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(SchemaError::InvalidDefine {
                            path: path.to_string(),
                            reason: format!("min {lo} exceeds max {hi}"),
                        });
                    }
                }
                Ok(())
            }
            Define::Bool { mapping } => {
                if let Some(key) = mapping.keys().find(|k| *k != "0" && *k != "1") {
                    return Err(SchemaError::InvalidDefine {
                        path: path.to_string(),
                        reason: format!("bool mapping key {key} is not 0 or 1"),
                    });
                }
                Ok(())
            }
            Define::String { .. } => Ok(()),
            Define::Enum { mapping } => {
                if mapping.is_empty() {
                    return Err(SchemaError::InvalidDefine {
                        path: path.to_string(),
                        reason: "enum mapping is empty".to_string(),
                    });
                }
                if let Some(key) = mapping.keys().find(|k| !is_canonical_int(k)) {
                    return Err(SchemaError::InvalidDefine {
                        path: path.to_string(),
                        reason: format!("enum mapping key '{key}' is not a plain decimal integer"),
                    });
                }
                Ok(())
            }
            Define::Array { array_info, .. } => {
                if matches!(**array_info, Define::Array { .. }) {
                    return Err(SchemaError::InvalidDefine {
                        path: path.to_string(),
                        reason: "nested arrays are not supported".to_string(),
                    });
                }
                array_info.check(&format!("{path}[]"))
            }
            Define::Struct { specs } => {
                let mut seen = HashSet::new();
                for field in specs {
                    let field_path = format!("{path}.{}", field.identifier);
                    if Identifier::parse(field.identifier.as_str()).is_err() {
                        return Err(SchemaError::InvalidIdentifier(field_path));
                    }
                    if !seen.insert(field.identifier.as_str()) {
                        return Err(SchemaError::DuplicateIdentifier {
                            category: "struct field",
                            identifier: field_path,
                        });
                    }
                    field.define.check(&field_path)?;
                }
                Ok(())
            }
        }
    }
}

// Coerced enum values are looked up by their `to_string()` form, so keys
// such as "01", "+2" or "-0" could never match.
fn is_canonical_int(key: &str) -> bool {
    key.parse::<i64>().is_ok_and(|v| v.to_string() == key)
}
