use crate::{text::ParseError, wire::WireError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured error with a stable internal classification.
/// Module errors (`ParseError`, `WireError`, ...) convert into this type at
/// the crate boundary; the original detail is kept when it carries data
/// callers need (for example a token location).
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Source error kept for callers that need more than the message.
    /// `Parse` only appears with `ErrorOrigin::Text`, `Wire` with `ErrorOrigin::Wire`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Plain error with no attached source.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an aggregation-origin invalid argument error.
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvalidArgument,
            ErrorOrigin::Aggregation,
            message.into(),
        )
    }

    /// Construct a registry-origin conflict.
    pub(crate) fn registry_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Conflict, ErrorOrigin::Registry, message.into())
    }

    /// Payload codec failure; `class` separates bad input from our own bugs.
    pub(crate) fn serialize(class: ErrorClass, message: impl Into<String>) -> Self {
        Self::new(class, ErrorOrigin::Serialize, message)
    }

    /// Return the token location when this error came from the text codec.
    #[must_use]
    pub const fn parse_detail(&self) -> Option<&ParseError> {
        match &self.detail {
            Some(ErrorDetail::Parse(err)) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self.class, ErrorClass::Parse)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Codec errors that survive conversion so locations and offsets stay
/// inspectable.
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Parse(ParseError),

    #[error("{0}")]
    Wire(WireError),
}

impl From<ParseError> for InternalError {
    fn from(err: ParseError) -> Self {
        Self {
            class: ErrorClass::Parse,
            origin: ErrorOrigin::Text,
            message: err.to_string(),
            detail: Some(ErrorDetail::Parse(err)),
        }
    }
}

impl From<WireError> for InternalError {
    fn from(err: WireError) -> Self {
        Self {
            class: err.class(),
            origin: ErrorOrigin::Wire,
            message: err.to_string(),
            detail: Some(ErrorDetail::Wire(err)),
        }
    }
}

///
/// ErrorClass
///
/// What went wrong, independent of which layer noticed it.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidArgument,
    Parse,
    Corruption,
    Internal,
    Conflict,
    Unsupported,
}

impl ErrorClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::Parse => "parse",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::Conflict => "conflict",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// ErrorOrigin
///
/// Layer that raised the error.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Aggregation,
    Config,
    Registry,
    Schema,
    Serialize,
    Text,
    Wire,
}

impl ErrorOrigin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggregation => "aggregation",
            Self::Config => "config",
            Self::Registry => "registry",
            Self::Schema => "schema",
            Self::Serialize => "serialize",
            Self::Text => "text",
            Self::Wire => "wire",
        }
    }
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{ErrorClass, ErrorOrigin, InternalError};
    use crate::{
        text::{ParseError, TokenLocation},
        wire::WireError,
    };

    #[test]
    fn parse_error_keeps_location_detail() {
        let err: InternalError =
            ParseError::new(TokenLocation::new(2, 7), "Unexpected token START_ARRAY").into();

        assert_eq!(err.class, ErrorClass::Parse);
        assert_eq!(err.origin, ErrorOrigin::Text);
        let detail = err.parse_detail().expect("parse detail should be kept");
        assert_eq!(detail.location(), TokenLocation::new(2, 7));
        assert!(
            err.message.contains("[2:7]"),
            "message should carry the location: {err:?}"
        );
    }

    #[test]
    fn wire_errors_classify_by_kind() {
        let truncated: InternalError = WireError::UnexpectedEof { needed: 4 }.into();
        assert_eq!(truncated.class, ErrorClass::Corruption);
        assert_eq!(truncated.origin, ErrorOrigin::Wire);

        let version: InternalError = WireError::UnsupportedVersion { found: 99 }.into();
        assert_eq!(version.class, ErrorClass::Unsupported);
        assert_eq!(
            version.display_with_class(),
            format!("wire:unsupported: {}", version.message)
        );
    }
}
