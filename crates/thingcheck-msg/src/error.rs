use thiserror::Error;

use thingcheck_core::{CodeError, ErrorCode};
use thingcheck_schema::ValidationError;

/// Errors raised while decoding or routing device messages.
#[derive(Debug, Error)]
pub enum MsgError {
    /// Envelope or payload is not valid JSON for the expected shape.
    #[error("invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Product or device name of an envelope is malformed.
    #[error("invalid sender: {0}")]
    InvalidSender(#[from] ValidationError),
    /// The envelope does not address a verifiable thing message.
    #[error("unroutable message: handle={handle} type={msg_type} method={method}")]
    Unroutable {
        /// Envelope handle.
        handle: String,
        /// Envelope type.
        msg_type: String,
        /// Request method.
        method: String,
    },
}

impl From<MsgError> for CodeError {
    fn from(err: MsgError) -> Self {
        ErrorCode::Parameter
            .error()
            .with_detail(err.to_string())
            .with_source(err)
    }
}
