use crate::serialize::SerializeError;
use serde::{Serialize, de::DeserializeOwned};
use std::panic::{AssertUnwindSafe, catch_unwind};

pub(super) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    serde_cbor::to_vec(value).map_err(|err| SerializeError::Encode(err.to_string()))
}

/// The length check runs before any parsing, and a panicking decoder is
/// reported as a decode failure instead of unwinding into the caller.
pub(super) fn decode_bounded<T: DeserializeOwned>(
    bytes: &[u8],
    max_bytes: usize,
) -> Result<T, SerializeError> {
    if bytes.len() > max_bytes {
        return Err(SerializeError::TooLarge {
            len: bytes.len(),
            max_bytes,
        });
    }

    catch_unwind(AssertUnwindSafe(|| serde_cbor::from_slice::<T>(bytes)))
        .map_err(|_| SerializeError::Decode("decoder panicked".to_string()))?
        .map_err(|err| SerializeError::Decode(err.to_string()))
}

///
/// TESTS
///
