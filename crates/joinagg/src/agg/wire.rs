//! Framed aggregation trees.
//!
//! A frame is `vint(version)` followed by the tree written at that version.
//! The reader adopts the version from the header, so peers on an older
//! version still decode frames addressed to them.

use crate::{
    agg::{registry::AggregationRegistry, tree::SubAggregations},
    config::WireConfig,
    error::InternalError,
    wire::{StreamInput, StreamOutput, WireVersion},
};

/// Encode `aggregations` for a peer speaking `version`.
pub fn encode_aggregations(
    aggregations: &SubAggregations,
    version: WireVersion,
) -> Result<Vec<u8>, InternalError> {
    let mut out = StreamOutput::new(version);
    out.write_vint(version.id());
    aggregations.write_to(&mut out)?;

    Ok(out.into_bytes())
}

/// Decode a frame; every byte must belong to the tree.
pub fn decode_aggregations(
    bytes: &[u8],
    registry: &AggregationRegistry,
    limits: WireConfig,
) -> Result<SubAggregations, InternalError> {
    let mut header = StreamInput::with_limits(bytes, WireVersion::V1, limits);
    let version = WireVersion::from_id(header.read_vint()?)?;
    let body = &bytes[bytes.len() - header.remaining()..];

    let mut input = StreamInput::with_limits(body, version, limits);
    let aggregations = SubAggregations::read_from(&mut input, registry)?;
    input.finish()?;

    tracing::trace!(
        version = %version,
        top_level = aggregations.len(),
        bytes = bytes.len(),
        "aggregation frame decoded"
    );

    Ok(aggregations)
}

///
/// TESTS
///
