//! Codec limits and defaults.
//!
//! Every limit has a compile-time default so callers that never load a
//! config file get the same behavior as an empty TOML document.

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use serde::Deserialize;
use thiserror::Error as ThisError;

/// Default upper bound for one length-prefixed wire string.
pub const DEFAULT_MAX_WIRE_STRING_BYTES: usize = 64 * 1024;

/// Default upper bound for the CBOR metadata blob of one aggregation.
pub const DEFAULT_MAX_METADATA_BYTES: usize = 256 * 1024;

/// Default maximum nesting depth of an aggregation tree.
pub const DEFAULT_MAX_AGGREGATION_DEPTH: usize = 32;

/// Default upper bound for one text request body.
pub const DEFAULT_MAX_TEXT_INPUT_BYTES: usize = 1024 * 1024;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid aggregation config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid aggregation config: '{field}' must be greater than zero")]
    ZeroLimit { field: &'static str },
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::InvalidArgument, ErrorOrigin::Config, err.to_string())
    }
}

///
/// AggregationConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    pub wire: WireConfig,
    pub parse: ParseConfig,
}

impl AggregationConfig {
    /// Parse a TOML document into a validated config.
    ///
    /// ```toml
    /// [wire]
    /// max_metadata_bytes = 4096
    ///
    /// [parse]
    /// max_depth = 8
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("wire.max_string_bytes", self.wire.max_string_bytes),
            ("wire.max_metadata_bytes", self.wire.max_metadata_bytes),
            ("wire.max_depth", self.wire.max_depth),
            ("parse.max_depth", self.parse.max_depth),
            ("parse.max_input_bytes", self.parse.max_input_bytes),
        ];

        for (field, value) in limits {
            if value == 0 {
                return Err(ConfigError::ZeroLimit { field });
            }
        }

        Ok(())
    }
}

///
/// WireConfig
/// Decode-side bounds for untrusted binary input.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WireConfig {
    pub max_string_bytes: usize,
    pub max_metadata_bytes: usize,
    pub max_depth: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_string_bytes: DEFAULT_MAX_WIRE_STRING_BYTES,
            max_metadata_bytes: DEFAULT_MAX_METADATA_BYTES,
            max_depth: DEFAULT_MAX_AGGREGATION_DEPTH,
        }
    }
}

///
/// ParseConfig
/// Bounds for text request bodies.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ParseConfig {
    pub max_depth: usize,
    pub max_input_bytes: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_AGGREGATION_DEPTH,
            max_input_bytes: DEFAULT_MAX_TEXT_INPUT_BYTES,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{AggregationConfig, ConfigError, DEFAULT_MAX_TEXT_INPUT_BYTES};

    #[test]
    fn empty_document_yields_defaults() {
        let config = AggregationConfig::from_toml_str("").expect("empty config should load");
        assert_eq!(config, AggregationConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AggregationConfig::from_toml_str(
            "[wire]\nmax_metadata_bytes = 4096\n\n[parse]\nmax_depth = 8\n",
        )
        .expect("partial config should load");

        assert_eq!(config.wire.max_metadata_bytes, 4096);
        assert_eq!(config.parse.max_depth, 8);
        assert_eq!(config.parse.max_input_bytes, DEFAULT_MAX_TEXT_INPUT_BYTES);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = AggregationConfig::from_toml_str("[parse]\nmax_depth = 0\n")
            .expect_err("zero depth should be rejected");

        assert!(
            matches!(err, ConfigError::ZeroLimit { field: "parse.max_depth" }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AggregationConfig::from_toml_str("[wire]\nversion = 3\n")
            .expect_err("unknown key should be rejected");

        assert!(matches!(err, ConfigError::Toml(_)), "unexpected error: {err:?}");
    }
}
