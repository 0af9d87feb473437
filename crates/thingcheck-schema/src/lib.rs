//! Thing Model schema primitives for device telemetry verification.
//!
//! A Thing Model describes what one device type may report: properties,
//! events and actions, each field carrying a [`Define`] (type tag plus
//! constraints). This crate only materializes and resolves an already
//! authored model; it never mutates one during verification.
//!
#![deny(missing_docs)]

/// Parameter categories a message can be verified as.
pub mod category;
/// Field type definitions and their constraints.
pub mod define;
/// Identifier newtypes (field identifiers, product IDs, device names).
pub mod identifiers;
/// Thing Model definitions and the resolution contract.
pub mod model;
/// Validation errors for schema primitives.
pub mod validation;

pub use category::ParamCategory;
pub use define::{DataType, Define, Pattern, StructField};
pub use identifiers::{DeviceName, Identifier, ProductId};
pub use model::{
    Action, Event, EventType, Model, ModelDocument, ParamDef, Property, PropertyMode, SchemaError,
    SchemaModel,
};
pub use validation::ValidationError;
