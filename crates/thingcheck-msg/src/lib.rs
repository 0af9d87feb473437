//! Device message surface around the verification engine.
//!
//! This crate provides:
//! - [`DevPublish`], [`InnerPublish`] and [`DevConn`], the envelopes
//!   exchanged with the device gateway
//! - [`Req`], the thing request carried in an envelope payload, with batched
//!   snapshots and sub-device reports
//! - [`route`], mapping an envelope's handle, type and method to the
//!   parameter category to verify against
//! - [`MsgTokenGenerator`], correlation tokens for outbound messages
//!
#![deny(missing_docs)]

/// Device gateway envelopes.
pub mod envelope;
/// Message surface errors.
pub mod error;
/// Thing request payloads.
pub mod req;
/// Category routing.
pub mod route;
/// Correlation tokens.
pub mod token;

pub use envelope::{
    get_publish, publish_to_dev, ConnAction, DevConn, DevPublish, GatewayMsg, InnerPublish,
};
pub use error::MsgError;
pub use req::{BatchReport, CommonMsg, Req, SubDevice};
pub use route::{route, HANDLE_THING};
pub use token::MsgTokenGenerator;
