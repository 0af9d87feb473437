//! Category-dispatched parameter verification.
//!
//! Properties are lenient: undeclared fields and `null` values are skipped,
//! and the raw message drives iteration. Events and actions are strict: the
//! declared parameter list drives iteration and every declared parameter
//! must be present with a non-null value.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use thingcheck_schema::{ParamCategory, ParamDef, SchemaModel};

use crate::coerce::{coerce, CoerceError};
use crate::errors::{CodeError, ErrorCode};
use crate::options::{ActionOutputParams, UnknownFieldPolicy, VerifyOptions};
use crate::param::{Param, Verified};

/// Borrowed view of one inbound message, as far as verification needs it.
#[derive(Debug, Clone, Copy)]
pub struct RawMessage<'a> {
    /// Raw field mapping.
    pub params: &'a Map<String, Value>,
    /// Event identifier; events only.
    pub event_id: &'a str,
    /// Action identifier; actions only.
    pub action_id: &'a str,
    /// Reported sub-type (`info`, `alert`, `fault`, ...); empty when absent.
    pub msg_type: &'a str,
    /// Report time in milliseconds since the epoch.
    pub timestamp: Option<i64>,
}

impl<'a> RawMessage<'a> {
    /// Creates a message carrying only a field mapping.
    pub fn new(params: &'a Map<String, Value>) -> Self {
        Self {
            params,
            event_id: "",
            action_id: "",
            msg_type: "",
            timestamp: None,
        }
    }

    /// Sets the event identifier.
    pub fn event(mut self, event_id: &'a str) -> Self {
        self.event_id = event_id;
        self
    }

    /// Sets the action identifier.
    pub fn action(mut self, action_id: &'a str) -> Self {
        self.action_id = action_id;
        self
    }

    /// Sets the reported sub-type.
    pub fn with_type(mut self, msg_type: &'a str) -> Self {
        self.msg_type = msg_type;
        self
    }

    /// Sets the report time.
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Verifies raw messages against one schema.
///
/// Holds only a shared reference to the schema and a copy of the options,
/// so one validator can serve any number of threads.
#[derive(Debug)]
pub struct Validator<'s, S: SchemaModel + ?Sized> {
    pub(crate) schema: &'s S,
    pub(crate) options: VerifyOptions,
}

impl<S: SchemaModel + ?Sized> Clone for Validator<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: SchemaModel + ?Sized> Copy for Validator<'_, S> {}

impl<'s, S: SchemaModel + ?Sized> Validator<'s, S> {
    /// Creates a validator over `schema`.
    pub fn new(schema: &'s S, options: VerifyOptions) -> Self {
        Self { schema, options }
    }

    /// The options in effect.
    pub fn options(&self) -> VerifyOptions {
        self.options
    }

    /// Verifies `msg` as a message of `category`.
    ///
    /// Returns the first blocking error; no partial result is produced.
    pub fn verify(
        &self,
        msg: &RawMessage<'_>,
        category: ParamCategory,
    ) -> Result<Verified, CodeError> {
        match category {
            ParamCategory::Property => self.verify_property(msg),
            ParamCategory::Event => self.verify_event(msg),
            ParamCategory::ActionInput | ParamCategory::ActionOutput => {
                self.verify_action(msg, category)
            }
        }
    }

    fn verify_property(&self, msg: &RawMessage<'_>) -> Result<Verified, CodeError> {
        let mut params = BTreeMap::new();
        for (key, raw) in msg.params {
            let Some(property) = self.schema.resolve_property(key) else {
                match self.options.unknown_fields {
                    UnknownFieldPolicy::Drop => debug!(field = %key, "dropping undeclared property"),
                    UnknownFieldPolicy::Warn => warn!(field = %key, "dropping undeclared property"),
                }
                continue;
            };
            let Some(value) = coerce(raw, &property.define).map_err(|e| invalid(key, e))? else {
                debug!(field = %key, "skipping null property");
                continue;
            };
            params.insert(key.clone(), Param::from_property(property, value));
        }
        Ok(Verified {
            params,
            event_type: None,
        })
    }

    fn verify_event(&self, msg: &RawMessage<'_>) -> Result<Verified, CodeError> {
        let Some(event) = self.schema.resolve_event(msg.event_id) else {
            return Err(ErrorCode::UnknownEvent.error().with_detail(msg.event_id));
        };

        if !msg.msg_type.is_empty() && msg.msg_type != event.event_type.as_str() {
            return Err(ErrorCode::TypeMismatch
                .error()
                .with_detail(event.identifier.as_str())
                .with_detail(format!(
                    "declared {}, reported {}",
                    event.event_type, msg.msg_type
                )));
        }

        let params = self.verify_declared(&event.params, msg.params)?;
        Ok(Verified {
            params,
            event_type: Some(event.event_type),
        })
    }

    fn verify_action(
        &self,
        msg: &RawMessage<'_>,
        category: ParamCategory,
    ) -> Result<Verified, CodeError> {
        let Some(action) = self.schema.resolve_action(msg.action_id) else {
            return Err(ErrorCode::UnknownAction.error().with_detail(msg.action_id));
        };

        let declared = match (category, self.options.action_output_params) {
            (ParamCategory::ActionOutput, ActionOutputParams::Output) => &action.output,
            (ParamCategory::ActionOutput, ActionOutputParams::Input) => {
                debug!(
                    action = %action.identifier,
                    "verifying action output against the input parameter list"
                );
                &action.input
            }
            _ => &action.input,
        };

        let params = self.verify_declared(declared, msg.params)?;
        Ok(Verified {
            params,
            event_type: None,
        })
    }

    fn verify_declared(
        &self,
        declared: &[ParamDef],
        raw: &Map<String, Value>,
    ) -> Result<BTreeMap<String, Param>, CodeError> {
        let mut params = BTreeMap::new();
        for def in declared {
            let id = def.identifier.as_str();
            let value = match raw.get(id) {
                Some(raw) => coerce(raw, &def.define).map_err(|e| invalid(id, e))?,
                None => None,
            };
            let Some(value) = value else {
                return Err(ErrorCode::MissingParameter.error().with_detail(id));
            };
            params.insert(id.to_string(), Param::from_def(def, value));
        }
        Ok(params)
    }
}

/// Verifies `msg` against `schema` with default options.
pub fn verify<S: SchemaModel + ?Sized>(
    schema: &S,
    msg: &RawMessage<'_>,
    category: ParamCategory,
) -> Result<Verified, CodeError> {
    Validator::new(schema, VerifyOptions::default()).verify(msg, category)
}

fn invalid(id: &str, err: CoerceError) -> CodeError {
    let detail = format!("{id}{}: {}", err.path(), err.leaf());
    ErrorCode::InvalidParameter
        .error()
        .with_detail(id)
        .with_detail(detail)
        .with_source(err)
}
