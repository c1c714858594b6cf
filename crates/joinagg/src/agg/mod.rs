//! Module: agg
//! Responsibility: aggregation definitions, their two codecs, and the
//! factories built from them for one search.
//! Does not own: bucket collection or result reduction.
//! Boundary: definitions are immutable once built; per-search state lives
//! only in resolution results and factories.

pub(crate) mod base;
pub mod children;
pub(crate) mod factory;
pub(crate) mod metadata;
pub(crate) mod registry;
pub(crate) mod text;
pub(crate) mod tree;
pub(crate) mod values_source;
pub(crate) mod wire;

use crate::{error::InternalError, wire::StreamOutput};
use serde_json::Value as JsonValue;
use std::sync::Arc;

// re-exports
pub use base::{AGGREGATIONS_FIELD, AGGREGATIONS_FIELD_SHORT, AggregationBase, META_FIELD};
pub use children::{ChildrenAggregation, ChildrenAggregatorFactory, ChildrenConfig, JoinFilters};
pub use factory::{AggregatorFactory, build_sub_factories, factory_depth};
pub use metadata::{FiniteFloat, MetaValue, Metadata, NonFiniteFloat};
pub use registry::{
    AggregationRegistry, AggregationRegistryBuilder, AggregationSpec, TextReader, WireReader,
    default_registry,
};
pub use text::parse_aggregations;
pub use tree::SubAggregations;
pub use values_source::{AggregationContext, RegistryKey, ValuesSourceConfig, ValuesSourceType};
pub use wire::{decode_aggregations, encode_aggregations};

///
/// BucketCardinality
///
/// How many buckets an aggregation produces per owning bucket.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BucketCardinality {
    None,
    One,
    Many,
}

///
/// AggregationNode
///
/// One aggregation definition of any registered kind. Trees hold nodes;
/// the variant decides the body layout in both codecs.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AggregationNode {
    Children(ChildrenAggregation),
}

impl AggregationNode {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Children(agg) => agg.name(),
        }
    }

    #[must_use]
    pub const fn aggregation_type(&self) -> &'static str {
        match self {
            Self::Children(agg) => agg.aggregation_type(),
        }
    }

    #[must_use]
    pub const fn bucket_cardinality(&self) -> BucketCardinality {
        match self {
            Self::Children(agg) => agg.bucket_cardinality(),
        }
    }

    #[must_use]
    pub const fn registry_key(&self) -> RegistryKey {
        match self {
            Self::Children(agg) => agg.registry_key(),
        }
    }

    #[must_use]
    pub const fn metadata(&self) -> Option<&Metadata> {
        match self {
            Self::Children(agg) => agg.metadata(),
        }
    }

    #[must_use]
    pub const fn sub_aggregations(&self) -> &SubAggregations {
        match self {
            Self::Children(agg) => agg.sub_aggregations(),
        }
    }

    #[must_use]
    pub const fn as_children(&self) -> Option<&ChildrenAggregation> {
        match self {
            Self::Children(agg) => Some(agg),
        }
    }

    /// Copy with replaced nested aggregations and metadata.
    #[must_use]
    pub fn shallow_copy(
        &self,
        sub_aggregations: SubAggregations,
        metadata: Option<Metadata>,
    ) -> Self {
        match self {
            Self::Children(agg) => Self::Children(agg.shallow_copy(sub_aggregations, metadata)),
        }
    }

    /// Write the node body; the type tag is written by the enclosing tree.
    pub fn write_to(&self, out: &mut StreamOutput) -> Result<(), InternalError> {
        match self {
            Self::Children(agg) => agg.write_to(out),
        }
    }

    /// Text form of the whole definition, `meta` and nested aggregations included.
    #[must_use]
    pub fn to_text(&self) -> JsonValue {
        match self {
            Self::Children(agg) => agg.definition_text(),
        }
    }

    /// Resolve against `ctx` and package the result for the execution engine.
    #[must_use]
    pub fn build(
        &self,
        ctx: &AggregationContext<'_>,
        parent: Option<Arc<dyn AggregatorFactory>>,
    ) -> Arc<dyn AggregatorFactory> {
        match self {
            Self::Children(agg) => Arc::new(agg.build(ctx, parent)),
        }
    }
}

impl From<ChildrenAggregation> for AggregationNode {
    fn from(agg: ChildrenAggregation) -> Self {
        Self::Children(agg)
    }
}
