use crate::{
    agg::{
        AggregationNode, factory::AggregatorFactory, registry::AggregationRegistry,
        values_source::AggregationContext,
    },
    error::InternalError,
    wire::{StreamInput, StreamOutput},
};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

///
/// SubAggregations
///
/// Ordered sibling aggregations. Sibling names are unique; order is
/// significant for equality and is preserved by both codecs.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SubAggregations {
    nodes: Vec<AggregationNode>,
}

impl SubAggregations {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a sibling, rejecting a name already present at this level.
    pub fn add(&mut self, node: impl Into<AggregationNode>) -> Result<(), InternalError> {
        let node = node.into();
        if self.get(node.name()).is_some() {
            return Err(InternalError::invalid_argument(format!(
                "Two sibling aggregations cannot have the same name: [{}]",
                node.name()
            )));
        }
        self.nodes.push(node);

        Ok(())
    }

    /// Builder-style [`SubAggregations::add`].
    pub fn with(mut self, node: impl Into<AggregationNode>) -> Result<Self, InternalError> {
        self.add(node)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AggregationNode> {
        self.nodes.iter().find(|node| node.name() == name)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregationNode> {
        self.nodes.iter()
    }

    /// Build one factory per sibling under `parent`.
    #[must_use]
    pub fn build(
        &self,
        ctx: &AggregationContext<'_>,
        parent: Option<&Arc<dyn AggregatorFactory>>,
    ) -> Vec<Arc<dyn AggregatorFactory>> {
        self.nodes
            .iter()
            .map(|node| node.build(ctx, parent.cloned()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Wire
    // ------------------------------------------------------------------

    /// Count, then `(type tag, body)` per sibling.
    pub fn write_to(&self, out: &mut StreamOutput) -> Result<(), InternalError> {
        let count = u32::try_from(self.nodes.len()).map_err(|_| {
            InternalError::invalid_argument("too many sibling aggregations to encode")
        })?;
        out.write_vint(count);

        for node in &self.nodes {
            out.write_string(node.aggregation_type())?;
            node.write_to(out)?;
        }

        Ok(())
    }

    pub fn read_from(
        input: &mut StreamInput<'_>,
        registry: &AggregationRegistry,
    ) -> Result<Self, InternalError> {
        let count = input.read_vint()?;
        if count == 0 {
            return Ok(Self::new());
        }

        input.descend(|input| {
            let mut out = Self::new();
            for _ in 0..count {
                let tag = input.read_string()?;
                out.add(registry.read_node(&tag, input)?)?;
            }

            Ok(out)
        })
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// `{"<name>": <node text>, ...}` in sibling order.
    #[must_use]
    pub fn to_text(&self) -> JsonValue {
        JsonValue::Object(
            self.nodes
                .iter()
                .map(|node| (node.name().to_string(), node.to_text()))
                .collect::<Map<_, _>>(),
        )
    }
}
