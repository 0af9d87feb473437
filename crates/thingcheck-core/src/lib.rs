//! Verification engine for inbound device telemetry.
//!
//! This crate provides:
//! - A value coercer that turns untyped JSON values into typed, bounds-checked
//!   [`ParamValue`]s according to a field's [`Define`](thingcheck_schema::Define)
//! - A parameter validator with per-category policy (lenient properties,
//!   strict events and actions)
//! - A batch verifier for buffered, timestamped snapshots
//! - [`CodeError`], the code-carrying error every failure is reported as
//!
//! Core invariants:
//! - Verified output never contains a field absent from the schema
//! - Events and actions require every declared parameter
//! - The first blocking error stops processing; batches fail as a whole
//! - Verification is synchronous and never mutates the schema, so one model
//!   may be shared by any number of concurrent callers
//!
#![deny(missing_docs)]

/// Snapshot batch verification.
pub mod batch;
/// Value coercion against a field define.
pub mod coerce;
/// Code-carrying error type.
pub mod errors;
/// Validator options.
pub mod options;
/// Verified parameter types.
pub mod param;
/// Typed parameter values.
pub mod value;
/// Category-dispatched parameter verification.
pub mod verify;

pub use batch::{verify_batch, verify_events, verify_properties, TimeParam, TimeParams};
pub use coerce::{coerce, CoerceError};
pub use errors::{CodeError, ErrorCode};
pub use options::{ActionOutputParams, UnknownFieldPolicy, VerifyOptions};
pub use param::{Param, Verified};
pub use value::ParamValue;
pub use verify::{verify, RawMessage, Validator};
