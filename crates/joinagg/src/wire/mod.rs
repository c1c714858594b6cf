//! Module: wire
//! Responsibility: versioned binary stream primitives (varints, strings, blobs).
//! Does not own: aggregation field layout; nodes write their own bodies.
//! Boundary: every decode failure surfaces as a typed `WireError`.


use crate::{config::WireConfig, error::ErrorClass};
use std::fmt;
use thiserror::Error as ThisError;

///
/// WireVersion
///
/// Protocol version negotiated between peers. Writers and readers consult it
/// to gate fields that older peers do not understand.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WireVersion(u32);

impl WireVersion {
    /// Initial layout: name, sub-aggregations, node body.
    pub const V1: Self = Self(1);

    /// Adds the optional metadata blob after the name.
    pub const V2: Self = Self(2);

    pub const CURRENT: Self = Self::V2;

    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Resolve a version id read from a stream header.
    pub const fn from_id(id: u32) -> Result<Self, WireError> {
        if id == 0 || id > Self::CURRENT.0 {
            return Err(WireError::UnsupportedVersion { found: id });
        }

        Ok(Self(id))
    }

    #[must_use]
    pub const fn on_or_after(self, other: Self) -> bool {
        self.0 >= other.0
    }
}

impl fmt::Display for WireVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

///
/// WireError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum WireError {
    #[error("unexpected end of stream: {needed} more byte(s) required")]
    UnexpectedEof { needed: usize },

    #[error("varint exceeds 32 bits")]
    VarintOverflow,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("{what} length {len} exceeds limit {max}")]
    LengthLimitExceeded {
        what: &'static str,
        len: usize,
        max: usize,
    },

    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBool(u8),

    #[error("unsupported wire version {found} (current is {})", WireVersion::CURRENT.id())]
    UnsupportedVersion { found: u32 },

    #[error("unknown aggregation type [{tag}] on the wire")]
    UnknownAggregationType { tag: String },

    #[error("aggregation tree exceeds maximum depth {max}")]
    DepthLimitExceeded { max: usize },

    #[error("{0} trailing byte(s) after message")]
    TrailingBytes(usize),

    #[error("invalid wire payload: {0}")]
    InvalidPayload(String),
}

impl WireError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedVersion { .. } | Self::UnknownAggregationType { .. } => {
                ErrorClass::Unsupported
            }
            _ => ErrorClass::Corruption,
        }
    }
}

///
/// StreamOutput
///
/// Append-only byte sink. Integers are unsigned LEB128 varints; strings and
/// blobs are length-prefixed.
///

#[derive(Debug)]
pub struct StreamOutput {
    version: WireVersion,
    buf: Vec<u8>,
}

impl StreamOutput {
    #[must_use]
    pub const fn new(version: WireVersion) -> Self {
        Self {
            version,
            buf: Vec::new(),
        }
    }

    #[must_use]
    pub const fn version(&self) -> WireVersion {
        self.version
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    // Each byte keeps the low seven bits plus the continuation flag.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_vint(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.buf.push(((value & 0x7f) as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    /// Write a length-prefixed byte blob.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let len = u32::try_from(bytes.len()).map_err(|_| WireError::LengthLimitExceeded {
            what: "blob",
            len: bytes.len(),
            max: u32::MAX as usize,
        })?;
        self.write_vint(len);
        self.buf.extend_from_slice(bytes);

        Ok(())
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<(), WireError> {
        self.write_bytes(value.as_bytes())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

///
/// StreamInput
///
/// Bounded cursor over received bytes. Every length read from the stream is
/// checked against `WireConfig` before any allocation happens.
///

#[derive(Debug)]
pub struct StreamInput<'a> {
    version: WireVersion,
    bytes: &'a [u8],
    pos: usize,
    limits: WireConfig,
    depth: usize,
}

impl<'a> StreamInput<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8], version: WireVersion) -> Self {
        Self::with_limits(bytes, version, WireConfig::default())
    }

    #[must_use]
    pub const fn with_limits(bytes: &'a [u8], version: WireVersion, limits: WireConfig) -> Self {
        Self {
            version,
            bytes,
            pos: 0,
            limits,
            depth: 0,
        }
    }

    #[must_use]
    pub const fn version(&self) -> WireVersion {
        self.version
    }

    #[must_use]
    pub const fn limits(&self) -> &WireConfig {
        &self.limits
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or(WireError::UnexpectedEof { needed: 1 })?;
        self.pos += 1;

        Ok(byte)
    }

    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }

    pub fn read_vint(&mut self) -> Result<u32, WireError> {
        let mut value: u32 = 0;

        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            let low = u32::from(byte & 0x7f);

            // The fifth byte may only carry the top four bits.
            if shift == 28 && low > 0x0f {
                return Err(WireError::VarintOverflow);
            }
            value |= low << shift;

            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }

        Err(WireError::VarintOverflow)
    }

    /// Read a length-prefixed blob no longer than `max` bytes.
    pub fn read_bytes(&mut self, what: &'static str, max: usize) -> Result<&'a [u8], WireError> {
        let len = self.read_vint()? as usize;
        if len > max {
            return Err(WireError::LengthLimitExceeded { what, len, max });
        }
        if len > self.remaining() {
            return Err(WireError::UnexpectedEof {
                needed: len - self.remaining(),
            });
        }

        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;

        Ok(slice)
    }

    pub fn read_string(&mut self) -> Result<String, WireError> {
        let max = self.limits.max_string_bytes;
        let bytes = self.read_bytes("string", max)?;

        std::str::from_utf8(bytes)
            .map(ToOwned::to_owned)
            .map_err(|_| WireError::InvalidUtf8)
    }

    /// Enter one level of the aggregation tree, enforcing the depth bound.
    pub(crate) fn descend<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, crate::error::InternalError>,
    ) -> Result<T, crate::error::InternalError> {
        if self.depth >= self.limits.max_depth {
            return Err(WireError::DepthLimitExceeded {
                max: self.limits.max_depth,
            }
            .into());
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        result
    }

    /// Fail unless every byte of the message was consumed.
    pub fn finish(&self) -> Result<(), WireError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(WireError::TrailingBytes(n)),
        }
    }
}
