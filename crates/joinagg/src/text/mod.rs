//! Module: text
//! Responsibility: streaming token view over JSON request bodies.
//! Does not own: aggregation grammar; node parsers drive the token stream.
//! Boundary: every failure is a `ParseError` carrying a 1-based location.

mod parser;

#[cfg(test)]
mod tests;

use std::fmt;
use thiserror::Error as ThisError;

pub use parser::TokenParser;

///
/// Token
///
/// Structural and scalar tokens, named after the wire names used in error
/// messages (`START_OBJECT`, `VALUE_STRING`, ...).
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    FieldName,
    ValueString,
    ValueNumber,
    ValueBoolean,
    ValueNull,
}

impl Token {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartObject => "START_OBJECT",
            Self::EndObject => "END_OBJECT",
            Self::StartArray => "START_ARRAY",
            Self::EndArray => "END_ARRAY",
            Self::FieldName => "FIELD_NAME",
            Self::ValueString => "VALUE_STRING",
            Self::ValueNumber => "VALUE_NUMBER",
            Self::ValueBoolean => "VALUE_BOOLEAN",
            Self::ValueNull => "VALUE_NULL",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TokenLocation
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TokenLocation {
    pub line: usize,
    pub column: usize,
}

impl TokenLocation {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for TokenLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

///
/// ParseError
///
/// Malformed or incomplete text input. The message names the offending
/// field or token; the location points at the token that triggered it.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("[{location}] {message}")]
pub struct ParseError {
    location: TokenLocation,
    message: String,
}

impl ParseError {
    pub fn new(location: TokenLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn location(&self) -> TokenLocation {
        self.location
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
