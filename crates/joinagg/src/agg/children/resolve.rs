use crate::{
    agg::{
        children::ChildrenAggregation,
        values_source::{AggregationContext, ValuesSourceConfig},
    },
    obs::sink::{self, MetricsEvent, ResolveOutcome},
    query::TermQuery,
};
use std::sync::Arc;

///
/// JoinFilters
///
/// Parent and child predicates derived from one parent-id field. They are
/// produced together, so a resolved configuration always carries both.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinFilters {
    parent: Arc<TermQuery>,
    child: Arc<TermQuery>,
}

impl JoinFilters {
    #[must_use]
    pub const fn new(parent: Arc<TermQuery>, child: Arc<TermQuery>) -> Self {
        Self { parent, child }
    }

    /// Selects every parent-type document of the relation.
    #[must_use]
    pub const fn parent(&self) -> &Arc<TermQuery> {
        &self.parent
    }

    /// Selects documents of exactly the requested child type.
    #[must_use]
    pub const fn child(&self) -> &Arc<TermQuery> {
        &self.child
    }
}

///
/// ChildrenConfig
///
/// Outcome of resolving a children aggregation against one index.
/// `Unmapped` is a normal result: the aggregation runs and sees no children.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChildrenConfig {
    Unmapped(ValuesSourceConfig),
    Resolved {
        config: ValuesSourceConfig,
        filters: JoinFilters,
    },
}

impl ChildrenConfig {
    #[must_use]
    pub const fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped(_))
    }

    #[must_use]
    pub const fn values_source(&self) -> &ValuesSourceConfig {
        match self {
            Self::Unmapped(config) | Self::Resolved { config, .. } => config,
        }
    }

    #[must_use]
    pub const fn filters(&self) -> Option<&JoinFilters> {
        match self {
            Self::Unmapped(_) => None,
            Self::Resolved { filters, .. } => Some(filters),
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (ValuesSourceConfig, Option<JoinFilters>) {
        match self {
            Self::Unmapped(config) => (config, None),
            Self::Resolved { config, filters } => (config, Some(filters)),
        }
    }
}

impl ChildrenAggregation {
    /// Resolve against the schema of `ctx`. Recomputed for every context;
    /// the definition itself is never modified.
    #[must_use]
    pub fn resolve_config(&self, ctx: &AggregationContext<'_>) -> ChildrenConfig {
        let Some(join) = ctx.schema().join_field() else {
            return self.unmapped(ctx, ResolveOutcome::UnmappedIndex);
        };
        let Some(id_field) = join.parent_id_field(&self.child_type, false) else {
            return self.unmapped(ctx, ResolveOutcome::UnmappedChildType);
        };

        let filters = JoinFilters::new(
            id_field.parent_filter(),
            id_field.child_filter(&self.child_type),
        );

        tracing::debug!(
            aggregation = self.name(),
            index = ctx.index_name(),
            child_type = %self.child_type,
            parent_type = id_field.parent_name(),
            field = %id_field.name(),
            "children aggregation resolved"
        );
        sink::record(MetricsEvent::Resolved {
            aggregation_type: Self::NAME,
            outcome: ResolveOutcome::Resolved,
        });

        ChildrenConfig::Resolved {
            config: ValuesSourceConfig::field_only(id_field.field_type()),
            filters,
        }
    }

    fn unmapped(&self, ctx: &AggregationContext<'_>, outcome: ResolveOutcome) -> ChildrenConfig {
        tracing::debug!(
            aggregation = self.name(),
            index = ctx.index_name(),
            child_type = %self.child_type,
            %outcome,
            "children aggregation unmapped"
        );
        sink::record(MetricsEvent::Resolved {
            aggregation_type: Self::NAME,
            outcome,
        });

        ChildrenConfig::Unmapped(ValuesSourceConfig::unmapped(
            self.default_value_source_type(),
        ))
    }
}
