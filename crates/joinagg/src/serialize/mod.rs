//! Module: serialize
//! CBOR encoding for opaque payloads embedded in aggregation frames.
//! Stream framing and version gating live in `crate::wire`; this layer only
//! turns a value into bytes and back under a caller-supplied size cap.

mod cbor;

use crate::error::{ErrorClass, InternalError};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("failed to encode payload: {0}")]
    Encode(String),

    #[error("failed to decode payload: {0}")]
    Decode(String),

    #[error("payload of {len} bytes exceeds the {max_bytes} byte limit")]
    TooLarge { len: usize, max_bytes: usize },
}

impl SerializeError {
    /// Encode failures come from our own values; everything else means the
    /// incoming bytes cannot be trusted.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        !matches!(self, Self::Encode(_))
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        let class = if err.is_corruption() {
            ErrorClass::Corruption
        } else {
            ErrorClass::Internal
        };

        Self::serialize(class, err.to_string())
    }
}

/// Encode `value` as CBOR.
pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    cbor::encode(value)
}

/// Decode a CBOR payload no longer than `max_bytes`.
pub fn deserialize_bounded<T: DeserializeOwned>(
    bytes: &[u8],
    max_bytes: usize,
) -> Result<T, SerializeError> {
    cbor::decode_bounded(bytes, max_bytes)
}
