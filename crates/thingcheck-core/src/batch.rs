use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use thingcheck_schema::{EventType, ParamCategory, SchemaModel};

use crate::errors::{CodeError, ErrorCode};
use crate::options::VerifyOptions;
use crate::param::Param;
use crate::verify::{RawMessage, Validator};

/// One buffered snapshot as reported by a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeParams {
    /// Report time in milliseconds since the epoch.
    pub timestamp: i64,
    /// Event identifier; event snapshots only.
    #[serde(rename = "eventID", default, skip_serializing_if = "String::is_empty")]
    pub event_id: String,
    /// Raw field mapping.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl TimeParams {
    /// Property snapshot at `timestamp`.
    pub fn property(timestamp: i64, params: Map<String, Value>) -> Self {
        Self {
            timestamp,
            event_id: String::new(),
            params,
        }
    }

    /// Event snapshot at `timestamp`.
    pub fn event(timestamp: i64, event_id: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            timestamp,
            event_id: event_id.into(),
            params,
        }
    }

    fn raw(&self) -> RawMessage<'_> {
        RawMessage::new(&self.params)
            .event(&self.event_id)
            .at(self.timestamp)
    }
}

/// One verified snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeParam {
    /// Report time carried over from the input snapshot.
    pub timestamp: i64,
    /// Event identifier carried over from the input snapshot.
    #[serde(rename = "eventID", skip_serializing_if = "String::is_empty")]
    pub event_id: String,
    /// Event type resolved from the schema.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    /// Verified parameters keyed by identifier.
    pub params: BTreeMap<String, Param>,
}

impl TimeParam {
    /// Normalized raw values keyed by identifier.
    pub fn to_values(&self) -> Map<String, Value> {
        self.params
            .iter()
            .map(|(id, param)| (id.clone(), param.value.to_json()))
            .collect()
    }
}

impl<S: SchemaModel + ?Sized> Validator<'_, S> {
    /// Verifies snapshots in order, stopping at the first failure.
    ///
    /// On failure nothing is returned for any snapshot, including the ones
    /// that verified before it. Only `property` and `event` are batchable.
    pub fn verify_batch(
        &self,
        snapshots: &[TimeParams],
        category: ParamCategory,
    ) -> Result<Vec<TimeParam>, CodeError> {
        if !matches!(category, ParamCategory::Property | ParamCategory::Event) {
            return Err(ErrorCode::Parameter
                .error()
                .with_detail(category.as_str())
                .with_detail("only property and event snapshots can be batched"));
        }

        let mut out = Vec::with_capacity(snapshots.len());
        for (index, snapshot) in snapshots.iter().enumerate() {
            let verified = self.verify(&snapshot.raw(), category).inspect_err(|err| {
                debug!(index, timestamp = snapshot.timestamp, error = %err, "batch aborted");
            })?;
            out.push(TimeParam {
                timestamp: snapshot.timestamp,
                event_id: snapshot.event_id.clone(),
                event_type: verified.event_type,
                params: verified.params,
            });
        }
        Ok(out)
    }

    /// Verifies buffered property snapshots.
    pub fn verify_properties(&self, snapshots: &[TimeParams]) -> Result<Vec<TimeParam>, CodeError> {
        self.verify_batch(snapshots, ParamCategory::Property)
    }

    /// Verifies buffered event snapshots.
    pub fn verify_events(&self, snapshots: &[TimeParams]) -> Result<Vec<TimeParam>, CodeError> {
        self.verify_batch(snapshots, ParamCategory::Event)
    }
}

/// Verifies snapshots against `schema` with default options.
pub fn verify_batch<S: SchemaModel + ?Sized>(
    schema: &S,
    snapshots: &[TimeParams],
    category: ParamCategory,
) -> Result<Vec<TimeParam>, CodeError> {
    Validator::new(schema, VerifyOptions::default()).verify_batch(snapshots, category)
}

/// Verifies buffered property snapshots with default options.
pub fn verify_properties<S: SchemaModel + ?Sized>(
    schema: &S,
    snapshots: &[TimeParams],
) -> Result<Vec<TimeParam>, CodeError> {
    verify_batch(schema, snapshots, ParamCategory::Property)
}

/// Verifies buffered event snapshots with default options.
pub fn verify_events<S: SchemaModel + ?Sized>(
    schema: &S,
    snapshots: &[TimeParams],
) -> Result<Vec<TimeParam>, CodeError> {
    verify_batch(schema, snapshots, ParamCategory::Event)
}
