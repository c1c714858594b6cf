use crate::{
    agg::{metadata::Metadata, registry::AggregationRegistry, tree::SubAggregations},
    error::InternalError,
    serialize::{deserialize_bounded, serialize},
    wire::{StreamInput, StreamOutput, WireError, WireVersion},
};
use serde_json::{Map, Value as JsonValue};

/// Text key carrying aggregation metadata.
pub const META_FIELD: &str = "meta";

/// Text key written for nested aggregations; `aggs` is accepted on input.
pub const AGGREGATIONS_FIELD: &str = "aggregations";
pub const AGGREGATIONS_FIELD_SHORT: &str = "aggs";

/// Names must be non-empty and free of the bucket-path separators `[`, `]`
/// and `>`. The error is the message each codec wraps in its own type.
pub(crate) fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.contains(['[', ']', '>']) {
        return Err(format!(
            "Invalid aggregation name [{name}]. Aggregation names can contain any character except '[', ']', and '>'"
        ));
    }

    Ok(())
}

///
/// AggregationBase
///
/// Fields every aggregation kind carries: its name inside the parent tree,
/// optional metadata, and its nested aggregations. Concrete kinds embed it
/// and add their own parameters.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AggregationBase {
    name: String,
    metadata: Option<Metadata>,
    sub_aggregations: SubAggregations,
}

impl AggregationBase {
    pub fn new(name: impl Into<String>) -> Result<Self, InternalError> {
        let name = name.into();
        validate_name(&name).map_err(InternalError::invalid_argument)?;

        Ok(Self {
            name,
            metadata: None,
            sub_aggregations: SubAggregations::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub const fn sub_aggregations(&self) -> &SubAggregations {
        &self.sub_aggregations
    }

    /// Same name, swapped metadata and nested aggregations.
    #[must_use]
    pub fn with_parts(
        &self,
        sub_aggregations: SubAggregations,
        metadata: Option<Metadata>,
    ) -> Self {
        Self {
            name: self.name.clone(),
            metadata,
            sub_aggregations,
        }
    }

    pub(crate) fn set_metadata(&mut self, metadata: Option<Metadata>) {
        self.metadata = metadata;
    }

    pub(crate) const fn sub_aggregations_mut(&mut self) -> &mut SubAggregations {
        &mut self.sub_aggregations
    }

    // ------------------------------------------------------------------
    // Wire
    // ------------------------------------------------------------------

    /// Name, nested aggregations, then (from V2) the metadata blob.
    pub fn write_to(&self, out: &mut StreamOutput) -> Result<(), InternalError> {
        out.write_string(&self.name)?;
        self.sub_aggregations.write_to(out)?;

        if out.version().on_or_after(WireVersion::V2) {
            match &self.metadata {
                Some(metadata) => {
                    out.write_bool(true);
                    out.write_bytes(&serialize(metadata)?)?;
                }
                None => out.write_bool(false),
            }
        }

        Ok(())
    }

    pub fn read_from(
        input: &mut StreamInput<'_>,
        registry: &AggregationRegistry,
    ) -> Result<Self, InternalError> {
        let name = input.read_string()?;
        validate_name(&name).map_err(WireError::InvalidPayload)?;
        let sub_aggregations = SubAggregations::read_from(input, registry)?;

        let metadata = if input.version().on_or_after(WireVersion::V2) && input.read_bool()? {
            let max = input.limits().max_metadata_bytes;
            let blob = input.read_bytes("metadata", max)?;
            Some(deserialize_bounded::<Metadata>(blob, max)?)
        } else {
            None
        };

        Ok(Self {
            name,
            metadata,
            sub_aggregations,
        })
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Wrap a kind-specific body: `{"meta": .., "<type>": body, "aggregations": ..}`.
    #[must_use]
    pub fn wrap_text(&self, aggregation_type: &str, body: JsonValue) -> JsonValue {
        let mut out = Map::new();
        if let Some(metadata) = &self.metadata {
            out.insert(META_FIELD.to_string(), metadata.to_json());
        }
        out.insert(aggregation_type.to_string(), body);
        if !self.sub_aggregations.is_empty() {
            out.insert(
                AGGREGATIONS_FIELD.to_string(),
                self.sub_aggregations.to_text(),
            );
        }

        JsonValue::Object(out)
    }
}
