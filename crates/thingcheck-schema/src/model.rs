use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::define::Define;
use crate::identifiers::Identifier;

/// Errors raised while materializing a Thing Model.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document is not valid Thing Model JSON.
    #[error("invalid thing model JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// An identifier does not satisfy the identifier pattern.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// Two definitions share an identifier inside one category.
    #[error("duplicate {category} identifier: {identifier}")]
    DuplicateIdentifier {
        /// Category the duplicate was found in.
        category: &'static str,
        /// The duplicated identifier (with path for nested fields).
        identifier: String,
    },
    /// A define carries inconsistent constraints.
    #[error("invalid define at {path}: {reason}")]
    InvalidDefine {
        /// Field path of the offending define.
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Access mode of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyMode {
    /// Read only (reported by the device).
    #[default]
    R,
    /// Read/write (also settable from the cloud).
    Rw,
}

/// Fixed sub-type of an event definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Informational event.
    Info,
    /// Alert event.
    Alert,
    /// Fault event.
    Fault,
}

impl EventType {
    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Info => "info",
            EventType::Alert => "alert",
            EventType::Fault => "fault",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(EventType::Info),
            "alert" => Ok(EventType::Alert),
            "fault" => Ok(EventType::Fault),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

/// Property definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property identifier.
    pub identifier: Identifier,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Access mode.
    #[serde(default)]
    pub mode: PropertyMode,
    /// Whether the property is marked required in the model.
    #[serde(default)]
    pub required: bool,
    /// Type definition.
    #[serde(rename = "dataType")]
    pub define: Define,
}

/// Parameter declared by an event or action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    /// Parameter identifier.
    pub identifier: Identifier,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Type definition.
    #[serde(rename = "dataType")]
    pub define: Define,
}

/// Event definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier.
    pub identifier: Identifier,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Fixed event sub-type.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Declared parameters; all of them are required in a report.
    #[serde(default)]
    pub params: Vec<ParamDef>,
}

/// Action definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action identifier.
    pub identifier: Identifier,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Declared invocation parameters.
    #[serde(default)]
    pub input: Vec<ParamDef>,
    /// Declared reply parameters.
    #[serde(default)]
    pub output: Vec<ParamDef>,
}

/// Read-only resolution contract the verification engine consumes.
///
/// Implementations are shared across concurrent verification calls and
/// must not change while any call holds a reference.
pub trait SchemaModel: Send + Sync {
    /// Resolves a property definition by identifier.
    fn resolve_property(&self, id: &str) -> Option<&Property>;
    /// Resolves an event definition by identifier.
    fn resolve_event(&self, id: &str) -> Option<&Event>;
    /// Resolves an action definition by identifier.
    fn resolve_action(&self, id: &str) -> Option<&Action>;
}

/// On-disk shape of a Thing Model: one list per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Property definitions.
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Event definitions.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Action definitions.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// One device type's Thing Model, indexed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelDocument", into = "ModelDocument")]
pub struct Model {
    properties: HashMap<Identifier, Property>,
    events: HashMap<Identifier, Event>,
    actions: HashMap<Identifier, Action>,
}

impl Model {
    /// Builds a model from definition lists, checking identifiers and defines.
    pub fn from_parts(
        properties: Vec<Property>,
        events: Vec<Event>,
        actions: Vec<Action>,
    ) -> Result<Self, SchemaError> {
        let mut model = Model::default();

        for property in properties {
            check_identifier(&property.identifier)?;
            property.define.check(property.identifier.as_str())?;
            insert_unique(&mut model.properties, "property", property.identifier.clone(), property)?;
        }

        for event in events {
            check_identifier(&event.identifier)?;
            check_params(&event.identifier, "event param", &event.params)?;
            insert_unique(&mut model.events, "event", event.identifier.clone(), event)?;
        }

        for action in actions {
            check_identifier(&action.identifier)?;
            check_params(&action.identifier, "action input", &action.input)?;
            check_params(&action.identifier, "action output", &action.output)?;
            insert_unique(&mut model.actions, "action", action.identifier.clone(), action)?;
        }

        Ok(model)
    }

    /// Parses a Thing Model JSON document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let doc: ModelDocument = serde_json::from_str(json)?;
        Self::try_from(doc)
    }

    /// Iterates property definitions sorted by identifier.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        sorted(&self.properties)
    }

    /// Iterates event definitions sorted by identifier.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        sorted(&self.events)
    }

    /// Iterates action definitions sorted by identifier.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        sorted(&self.actions)
    }
}

impl SchemaModel for Model {
    fn resolve_property(&self, id: &str) -> Option<&Property> {
        self.properties.get(id)
    }

    fn resolve_event(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    fn resolve_action(&self, id: &str) -> Option<&Action> {
        self.actions.get(id)
    }
}

impl TryFrom<ModelDocument> for Model {
    type Error = SchemaError;

    fn try_from(doc: ModelDocument) -> Result<Self, Self::Error> {
        Model::from_parts(doc.properties, doc.events, doc.actions)
    }
}

impl From<Model> for ModelDocument {
    fn from(model: Model) -> Self {
        ModelDocument {
            properties: model.properties().cloned().collect(),
            events: model.events().cloned().collect(),
            actions: model.actions().cloned().collect(),
        }
    }
}

fn sorted<T>(map: &HashMap<Identifier, T>) -> impl Iterator<Item = &T> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries.into_iter().map(|(_, v)| v)
}

fn check_identifier(id: &Identifier) -> Result<(), SchemaError> {
    Identifier::parse(id.as_str())
        .map(|_| ())
        .map_err(|_| SchemaError::InvalidIdentifier(id.to_string()))
}

fn check_params(
    owner: &Identifier,
    category: &'static str,
    params: &[ParamDef],
) -> Result<(), SchemaError> {
    let mut seen = std::collections::HashSet::new();
    for param in params {
        let path = format!("{owner}.{}", param.identifier);
        if Identifier::parse(param.identifier.as_str()).is_err() {
            return Err(SchemaError::InvalidIdentifier(path));
        }
        if !seen.insert(param.identifier.as_str()) {
            return Err(SchemaError::DuplicateIdentifier {
                category,
                identifier: path,
            });
        }
        param.define.check(&path)?;
    }
    Ok(())
}

fn insert_unique<T>(
    map: &mut HashMap<Identifier, T>,
    category: &'static str,
    id: Identifier,
    value: T,
) -> Result<(), SchemaError> {
    if map.contains_key(&id) {
        return Err(SchemaError::DuplicateIdentifier {
            category,
            identifier: id.to_string(),
        });
    }
    map.insert(id, value);
    Ok(())
}
