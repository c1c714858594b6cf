//! Parent/child join aggregation definitions: the `children` bucket
//! aggregation, its binary and text codecs, resolution against an index
//! schema, and the factories handed to the execution engine.

// public exports are one module level down
pub mod agg;
pub mod config;
pub mod error;
pub mod model;
pub mod obs;
pub mod query;
pub mod serialize;
pub mod text;
pub mod wire;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, codecs, or metrics helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        agg::{
            AggregationContext, AggregationNode, BucketCardinality, ChildrenAggregation,
            ChildrenConfig, Metadata, SubAggregations,
        },
        model::{field::FieldKind, index::IndexSchema},
    };
}
