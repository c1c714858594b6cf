//! Module: agg::children
//! Responsibility: the parent/child join bucket aggregation. Collects the
//! child documents of each parent bucket into one `children` bucket.
//! Does not own: join field storage or bucket collection.
//! Boundary: filters are derived per search by `resolve_config`; they are
//! never stored on the definition nor sent over the wire.

mod codec;
mod factory;
mod resolve;


use crate::{
    agg::{
        AggregationNode, BucketCardinality,
        base::AggregationBase,
        metadata::Metadata,
        registry::AggregationSpec,
        tree::SubAggregations,
        values_source::{RegistryKey, ValuesSourceType},
    },
    error::InternalError,
};

pub use factory::ChildrenAggregatorFactory;
pub use resolve::{ChildrenConfig, JoinFilters};

///
/// ChildrenAggregation
///
/// Declarative `children` node: which child document type to join into
/// each parent bucket. Identity is structural over the base fields and
/// `child_type`.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ChildrenAggregation {
    base: AggregationBase,
    child_type: String,
}

impl ChildrenAggregation {
    /// Type tag in both codecs and in the registry.
    pub const NAME: &'static str = "children";

    /// The only key of the text body.
    pub const TYPE_FIELD: &'static str = "type";

    pub const SPEC: AggregationSpec = AggregationSpec {
        tag: Self::NAME,
        wire: Self::read_node,
        text: Self::parse_node,
    };

    /// Create a definition; a missing or empty `child_type` is rejected, as is
    /// a name the text codec could not read back.
    pub fn new(name: impl Into<String>, child_type: Option<&str>) -> Result<Self, InternalError> {
        let name = name.into();

        match child_type {
            None => Err(InternalError::invalid_argument(format!(
                "[child_type] must not be null: [{name}]"
            ))),
            Some("") => Err(InternalError::invalid_argument(format!(
                "[child_type] must not be empty: [{name}]"
            ))),
            Some(child_type) => Ok(Self {
                base: AggregationBase::new(name)?,
                child_type: child_type.to_string(),
            }),
        }
    }

    pub fn try_new(name: impl Into<String>, child_type: &str) -> Result<Self, InternalError> {
        Self::new(name, Some(child_type))
    }

    /// Copy with swapped nested aggregations and metadata; `child_type` is
    /// carried over as is.
    #[must_use]
    pub fn shallow_copy(
        &self,
        sub_aggregations: SubAggregations,
        metadata: Option<Metadata>,
    ) -> Self {
        Self {
            base: self.base.with_parts(sub_aggregations, metadata),
            child_type: self.child_type.clone(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.base.set_metadata(Some(metadata));
        self
    }

    /// Nest `node` under this aggregation.
    pub fn sub_aggregation(mut self, node: impl Into<AggregationNode>) -> Result<Self, InternalError> {
        self.base.sub_aggregations_mut().add(node)?;
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.base.name()
    }

    #[must_use]
    pub fn child_type(&self) -> &str {
        &self.child_type
    }

    #[must_use]
    pub const fn metadata(&self) -> Option<&Metadata> {
        self.base.metadata()
    }

    #[must_use]
    pub const fn sub_aggregations(&self) -> &SubAggregations {
        self.base.sub_aggregations()
    }

    #[must_use]
    pub const fn base(&self) -> &AggregationBase {
        &self.base
    }

    /// One `children` bucket per parent bucket, whatever the child type.
    #[must_use]
    pub const fn bucket_cardinality(&self) -> BucketCardinality {
        BucketCardinality::One
    }

    #[must_use]
    pub const fn aggregation_type(&self) -> &'static str {
        Self::NAME
    }

    /// Values-source type used when the join field is not mapped at all.
    #[must_use]
    pub const fn default_value_source_type(&self) -> ValuesSourceType {
        ValuesSourceType::Bytes
    }

    #[must_use]
    pub const fn registry_key(&self) -> RegistryKey {
        RegistryKey::UNREGISTERED
    }
}
