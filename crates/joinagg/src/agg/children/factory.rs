use crate::{
    agg::{
        children::{ChildrenAggregation, JoinFilters},
        factory::AggregatorFactory,
        metadata::Metadata,
        tree::SubAggregations,
        values_source::{AggregationContext, ValuesSourceConfig},
    },
    obs::sink::{self, MetricsEvent},
    query::TermQuery,
};
use std::sync::Arc;

///
/// ChildrenAggregatorFactory
///
/// Resolved `children` aggregation for one search: the values-source
/// configuration plus the parent and child filters the execution engine
/// joins on. An unmapped configuration has no filters and matches nothing.
///

#[derive(Debug)]
pub struct ChildrenAggregatorFactory {
    name: String,
    config: ValuesSourceConfig,
    filters: Option<JoinFilters>,
    index: String,
    parent: Option<Arc<dyn AggregatorFactory>>,
    sub_aggregations: SubAggregations,
    metadata: Option<Metadata>,
}

impl ChildrenAggregatorFactory {
    /// Package resolved pieces; no validation happens here.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        config: ValuesSourceConfig,
        filters: Option<JoinFilters>,
        ctx: &AggregationContext<'_>,
        parent: Option<Arc<dyn AggregatorFactory>>,
        sub_aggregations: SubAggregations,
        metadata: Option<Metadata>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            filters,
            index: ctx.index_name().to_string(),
            parent,
            sub_aggregations,
            metadata,
        }
    }

    /// True when resolution found no join relation for the child type.
    #[must_use]
    pub const fn matches_nothing(&self) -> bool {
        self.config.is_unmapped()
    }

    #[must_use]
    pub const fn values_source(&self) -> &ValuesSourceConfig {
        &self.config
    }

    #[must_use]
    pub const fn join_filters(&self) -> Option<&JoinFilters> {
        self.filters.as_ref()
    }

    #[must_use]
    pub fn parent_filter(&self) -> Option<&Arc<TermQuery>> {
        self.filters.as_ref().map(JoinFilters::parent)
    }

    #[must_use]
    pub fn child_filter(&self) -> Option<&Arc<TermQuery>> {
        self.filters.as_ref().map(JoinFilters::child)
    }

    /// Index this factory was resolved against.
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index
    }
}

impl AggregatorFactory for ChildrenAggregatorFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn aggregation_type(&self) -> &'static str {
        ChildrenAggregation::NAME
    }

    fn parent(&self) -> Option<&Arc<dyn AggregatorFactory>> {
        self.parent.as_ref()
    }

    fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    fn sub_aggregations(&self) -> &SubAggregations {
        &self.sub_aggregations
    }
}

impl ChildrenAggregation {
    /// Resolve against `ctx`, then package the outcome as a factory.
    #[must_use]
    pub fn build(
        &self,
        ctx: &AggregationContext<'_>,
        parent: Option<Arc<dyn AggregatorFactory>>,
    ) -> ChildrenAggregatorFactory {
        let (config, filters) = self.resolve_config(ctx).into_parts();
        let factory = ChildrenAggregatorFactory::new(
            self.name(),
            config,
            filters,
            ctx,
            parent,
            self.sub_aggregations().clone(),
            self.metadata().cloned(),
        );

        sink::record(MetricsEvent::FactoryBuilt {
            aggregation_type: Self::NAME,
        });

        factory
    }
}
