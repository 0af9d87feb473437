use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use thingcheck_core::{
    CodeError, RawMessage, TimeParam, TimeParams, Validator, Verified, VerifyOptions,
};
use thingcheck_schema::{ParamCategory, SchemaModel};

use crate::error::MsgError;

/// Fields shared by every device message payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonMsg {
    /// Request method (`report`, `eventPost`, `action`, `actionReply`, ...).
    #[serde(default)]
    pub method: String,
    /// Correlation token echoed in the reply.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg_token: String,
    /// Report time in milliseconds since the epoch; 0 when absent.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
    /// Reply status code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Reply status message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg: String,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// Thing model request: property reports, event posts, action calls and
/// their replies, optionally batched or on behalf of sub-devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Req {
    /// Method, token, timestamp and status.
    #[serde(flatten)]
    pub common: CommonMsg,
    /// Raw parameters.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    /// Properties the device is asked to report; empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,
    /// Protocol version, `1.0` when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Event identifier.
    #[serde(rename = "eventID", default, skip_serializing_if = "String::is_empty")]
    pub event_id: String,
    /// Action identifier.
    #[serde(rename = "actionID", default, skip_serializing_if = "String::is_empty")]
    pub action_id: String,
    /// Reported sub-type (`report`, `info`, `alert`, `fault`).
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub msg_type: String,
    /// Buffered property snapshots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<TimeParams>,
    /// Buffered event snapshots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<TimeParams>,
    /// Reports forwarded by a gateway on behalf of its sub-devices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_devices: Vec<SubDevice>,
}

/// Buffered snapshots reported by a gateway for one sub-device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubDevice {
    /// Sub-device product.
    #[serde(rename = "productID")]
    pub product_id: String,
    /// Sub-device name.
    pub device_name: String,
    /// Buffered property snapshots.
    #[serde(default)]
    pub properties: Vec<TimeParams>,
    /// Buffered event snapshots.
    #[serde(default)]
    pub events: Vec<TimeParams>,
}

/// Verified buffered snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Verified property snapshots, in report order.
    pub properties: Vec<TimeParam>,
    /// Verified event snapshots, in report order.
    pub events: Vec<TimeParam>,
}

impl Req {
    /// Decodes a request from an envelope payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self, MsgError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Report time, or `default_ms` when the device sent none.
    ///
    /// Times outside chrono's range fall back to the epoch.
    pub fn timestamp_or(&self, default_ms: i64) -> DateTime<Utc> {
        let ms = if self.common.timestamp == 0 {
            default_ms
        } else {
            self.common.timestamp
        };
        DateTime::from_timestamp_millis(ms).unwrap_or_default()
    }

    /// Borrowed view handed to the validator.
    pub fn raw(&self) -> RawMessage<'_> {
        let raw = RawMessage::new(&self.params)
            .event(&self.event_id)
            .action(&self.action_id)
            .with_type(&self.msg_type);
        if self.common.timestamp == 0 {
            raw
        } else {
            raw.at(self.common.timestamp)
        }
    }

    /// Verifies `params` as `category` with default options.
    pub fn verify_params<S: SchemaModel + ?Sized>(
        &self,
        schema: &S,
        category: ParamCategory,
    ) -> Result<Verified, CodeError> {
        self.verify_params_with(Validator::new(schema, VerifyOptions::default()), category)
    }

    /// Verifies `params` as `category`.
    pub fn verify_params_with<S: SchemaModel + ?Sized>(
        &self,
        validator: Validator<'_, S>,
        category: ParamCategory,
    ) -> Result<Verified, CodeError> {
        validator.verify(&self.raw(), category)
    }

    /// Verifies `params` and replaces them with their normalized values.
    ///
    /// For events the resolved event type is written back into `msg_type`.
    /// On failure the request is left untouched.
    pub fn fmt_params<S: SchemaModel + ?Sized>(
        &mut self,
        schema: &S,
        category: ParamCategory,
    ) -> Result<(), CodeError> {
        self.fmt_params_with(Validator::new(schema, VerifyOptions::default()), category)
    }

    /// [`fmt_params`](Self::fmt_params) with explicit validator options.
    pub fn fmt_params_with<S: SchemaModel + ?Sized>(
        &mut self,
        validator: Validator<'_, S>,
        category: ParamCategory,
    ) -> Result<(), CodeError> {
        let verified = self.verify_params_with(validator, category)?;
        debug!(
            method = %self.common.method,
            %category,
            kept = verified.len(),
            raw = self.params.len(),
            "normalized request params"
        );
        self.params = verified.to_values();
        if let Some(event_type) = verified.event_type {
            self.msg_type = event_type.to_string();
        }
        Ok(())
    }

    /// Verifies the buffered property and event snapshots with default options.
    pub fn verify_batch<S: SchemaModel + ?Sized>(&self, schema: &S) -> Result<BatchReport, CodeError> {
        self.verify_batch_with(Validator::new(schema, VerifyOptions::default()))
    }

    /// Verifies the buffered property and event snapshots.
    ///
    /// Properties are checked before events; the first failure discards both.
    pub fn verify_batch_with<S: SchemaModel + ?Sized>(
        &self,
        validator: Validator<'_, S>,
    ) -> Result<BatchReport, CodeError> {
        Ok(BatchReport {
            properties: validator.verify_properties(&self.properties)?,
            events: validator.verify_events(&self.events)?,
        })
    }

    /// Stamps a reply status from `err`.
    pub fn with_status(mut self, err: &CodeError) -> Self {
        self.common.code = Some(err.code().code());
        self.common.msg = err.detail_msg();
        self
    }
}

impl SubDevice {
    /// Verifies the sub-device's snapshots with default options.
    ///
    /// `schema` must be the model of the sub-device's own product.
    pub fn verify<S: SchemaModel + ?Sized>(&self, schema: &S) -> Result<BatchReport, CodeError> {
        self.verify_with(Validator::new(schema, VerifyOptions::default()))
    }

    /// Verifies the sub-device's snapshots.
    pub fn verify_with<S: SchemaModel + ?Sized>(
        &self,
        validator: Validator<'_, S>,
    ) -> Result<BatchReport, CodeError> {
        Ok(BatchReport {
            properties: validator.verify_properties(&self.properties)?,
            events: validator.verify_events(&self.events)?,
        })
    }
}
