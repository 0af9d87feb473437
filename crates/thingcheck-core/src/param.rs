use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use thingcheck_schema::{EventType, ParamDef, Property, PropertyMode};

use crate::value::ParamValue;

/// One verified parameter: schema metadata plus the coerced value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    /// Field identifier.
    pub identifier: String,
    /// Display name from the schema.
    pub name: String,
    /// Description from the schema.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Access mode; only properties carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<PropertyMode>,
    /// Required flag from the schema.
    pub required: bool,
    /// Coerced value.
    pub value: ParamValue,
}

impl Param {
    /// Builds a verified property parameter.
    pub fn from_property(property: &Property, value: ParamValue) -> Self {
        Self {
            identifier: property.identifier.to_string(),
            name: property.name.clone(),
            desc: property.desc.clone(),
            mode: Some(property.mode),
            required: property.required,
            value,
        }
    }

    /// Builds a verified event or action parameter; those are always required.
    pub fn from_def(def: &ParamDef, value: ParamValue) -> Self {
        Self {
            identifier: def.identifier.to_string(),
            name: def.name.clone(),
            desc: String::new(),
            mode: None,
            required: true,
            value,
        }
    }
}

/// Result of verifying one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Verified {
    /// Verified parameters keyed by identifier.
    pub params: BTreeMap<String, Param>,
    /// Event type resolved from the schema, for event messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
}

impl Verified {
    /// Normalized raw values keyed by identifier.
    pub fn to_values(&self) -> Map<String, Value> {
        self.params
            .iter()
            .map(|(id, param)| (id.clone(), param.value.to_json()))
            .collect()
    }

    /// Returns the verified parameter for `id`.
    pub fn get(&self, id: &str) -> Option<&Param> {
        self.params.get(id)
    }

    /// Number of verified parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true when nothing was verified.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
