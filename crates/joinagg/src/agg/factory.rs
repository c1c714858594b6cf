use crate::agg::{metadata::Metadata, tree::SubAggregations, values_source::AggregationContext};
use std::{fmt, sync::Arc};

///
/// AggregatorFactory
///
/// Executable configuration produced from one aggregation definition for
/// one search. The execution engine instantiates collectors from it; this
/// crate only guarantees the factory tree mirrors the definition tree.
///

pub trait AggregatorFactory: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn aggregation_type(&self) -> &'static str;

    /// Enclosing factory, `None` at the top level.
    fn parent(&self) -> Option<&Arc<dyn AggregatorFactory>>;

    fn metadata(&self) -> Option<&Metadata>;

    /// Definitions of nested aggregations, built on demand with this
    /// factory as their parent.
    fn sub_aggregations(&self) -> &SubAggregations;
}

/// Number of factories between `factory` and the top of its tree.
#[must_use]
pub fn factory_depth(factory: &dyn AggregatorFactory) -> usize {
    let mut depth = 0;
    let mut current = factory.parent();
    while let Some(parent) = current {
        depth += 1;
        current = parent.parent();
    }

    depth
}

/// Build the factories of `factory`'s nested aggregations, parented to it.
#[must_use]
pub fn build_sub_factories(
    factory: &Arc<dyn AggregatorFactory>,
    ctx: &AggregationContext<'_>,
) -> Vec<Arc<dyn AggregatorFactory>> {
    factory.sub_aggregations().build(ctx, Some(factory))
}
