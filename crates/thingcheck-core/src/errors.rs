//! Code-carrying error type.
//!
//! Every failure the engine reports is a [`CodeError`]: a stable
//! [`ErrorCode`], a message, an ordered list of detail strings (the first
//! one is always the offending identifier), and optionally the lower-level
//! error that caused it. Rendering into localized user messages is left to
//! the caller; two errors compare equal when their codes do.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Stable error codes raised by the engine.
///
/// Serialized as the numeric wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum ErrorCode {
    /// Unclassified failure.
    Default,
    /// Internal or environmental failure.
    System,
    /// Malformed request.
    Parameter,
    /// A lookup found nothing.
    NotFound,
    /// A schema-required field is absent from the input.
    MissingParameter,
    /// A present field failed type, range, enum or structure validation.
    InvalidParameter,
    /// The event identifier does not resolve in the schema.
    UnknownEvent,
    /// The action identifier does not resolve in the schema.
    UnknownAction,
    /// The event's declared type conflicts with the reported type.
    TypeMismatch,
}

impl ErrorCode {
    /// Numeric wire code.
    pub fn code(&self) -> i64 {
        match self {
            ErrorCode::Default => 100001,
            ErrorCode::System => 100002,
            ErrorCode::Parameter => 100003,
            ErrorCode::NotFound => 100004,
            ErrorCode::MissingParameter => 100005,
            ErrorCode::InvalidParameter => 100006,
            ErrorCode::UnknownEvent => 100007,
            ErrorCode::UnknownAction => 100008,
            ErrorCode::TypeMismatch => 100009,
        }
    }

    /// Looks a code up by its numeric value.
    pub fn from_code(code: i64) -> Option<Self> {
        [
            ErrorCode::Default,
            ErrorCode::System,
            ErrorCode::Parameter,
            ErrorCode::NotFound,
            ErrorCode::MissingParameter,
            ErrorCode::InvalidParameter,
            ErrorCode::UnknownEvent,
            ErrorCode::UnknownAction,
            ErrorCode::TypeMismatch,
        ]
        .into_iter()
        .find(|c| c.code() == code)
    }

    /// Default message for the code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Default => "error",
            ErrorCode::System => "system error",
            ErrorCode::Parameter => "parameter error",
            ErrorCode::NotFound => "not found",
            ErrorCode::MissingParameter => "missing parameter",
            ErrorCode::InvalidParameter => "invalid parameter",
            ErrorCode::UnknownEvent => "unknown event",
            ErrorCode::UnknownAction => "unknown action",
            ErrorCode::TypeMismatch => "event type mismatch",
        }
    }

    /// Creates an error carrying this code and its default message.
    pub fn error(self) -> CodeError {
        CodeError::new(self, self.message())
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<i64> for ErrorCode {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        ErrorCode::from_code(code).ok_or_else(|| format!("unknown error code {code}"))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error value carrying a code, a message, details and an optional cause.
#[derive(Debug, Clone, Error, Serialize)]
#[error("[{code}] {}", render_detail_msg(.msg, .details))]
pub struct CodeError {
    code: ErrorCode,
    msg: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
    #[source]
    #[serde(skip)]
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl CodeError {
    /// Creates an error with an explicit message.
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            details: Vec::new(),
            source: None,
        }
    }

    /// Appends a detail string.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Attaches the lower-level error that caused this one.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Converts any error into a `CodeError`.
    ///
    /// A `CodeError` passes through unchanged; anything else becomes a
    /// [`ErrorCode::System`] error wrapping it.
    pub fn wrap(err: impl StdError + Send + Sync + 'static) -> Self {
        let as_dyn: &(dyn StdError + 'static) = &err;
        if let Some(code_err) = as_dyn.downcast_ref::<CodeError>() {
            return code_err.clone();
        }
        ErrorCode::System
            .error()
            .with_detail(err.to_string())
            .with_source(err)
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The message.
    pub fn msg(&self) -> &str {
        &self.msg
    }

    /// Detail strings in the order they were attached.
    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Returns true if this error carries `code`.
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    /// Message plus details, as carried in a reply's status field.
    pub fn detail_msg(&self) -> String {
        render_detail_msg(&self.msg, &self.details)
    }
}

fn render_detail_msg(msg: &str, details: &[String]) -> String {
    if details.is_empty() {
        msg.to_string()
    } else {
        format!("msg={msg},detail={details:?}")
    }
}

impl PartialEq for CodeError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl From<ErrorCode> for CodeError {
    fn from(code: ErrorCode) -> Self {
        code.error()
    }
}

impl From<thingcheck_schema::SchemaError> for CodeError {
    fn from(err: thingcheck_schema::SchemaError) -> Self {
        ErrorCode::Parameter
            .error()
            .with_detail(err.to_string())
            .with_source(err)
    }
}
