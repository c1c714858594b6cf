use crate::{
    agg::{AggregationNode, children::ChildrenAggregation, tree::SubAggregations},
    config::{ParseConfig, WireConfig},
    error::InternalError,
    text::{ParseError, TokenLocation, TokenParser},
    wire::{StreamInput, WireError},
};
use std::{collections::BTreeMap, sync::OnceLock};

/// Decode one node body; the type tag has already been consumed.
pub type WireReader =
    fn(&mut StreamInput<'_>, &AggregationRegistry) -> Result<AggregationNode, InternalError>;

/// Parse one node body named `name`; the parser sits on its `START_OBJECT`.
pub type TextReader = fn(&str, &mut TokenParser<'_>) -> Result<AggregationNode, InternalError>;

///
/// AggregationSpec
///
/// Registration record for one aggregation kind: its type tag and the two
/// readers that reconstruct it.
///

#[derive(Clone, Copy, Debug)]
pub struct AggregationSpec {
    pub tag: &'static str,
    pub wire: WireReader,
    pub text: TextReader,
}

///
/// AggregationRegistry
///
/// Lookup from type tag to readers. Built once and shared read-only; the
/// codecs receive it explicitly so nested nodes of any registered kind can
/// be reconstructed.
///

#[derive(Debug)]
pub struct AggregationRegistry {
    specs: BTreeMap<&'static str, AggregationSpec>,
}

impl AggregationRegistry {
    #[must_use]
    pub const fn builder() -> AggregationRegistryBuilder {
        AggregationRegistryBuilder::new()
    }

    /// Registry holding every kind this crate ships.
    #[must_use]
    pub fn builtin() -> Self {
        AggregationRegistryBuilder::with_builtin().build()
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&AggregationSpec> {
        self.specs.get(tag)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.specs.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }

    /// Decode the node body registered under `tag`.
    pub fn read_node(
        &self,
        tag: &str,
        input: &mut StreamInput<'_>,
    ) -> Result<AggregationNode, InternalError> {
        let spec = self.get(tag).ok_or_else(|| WireError::UnknownAggregationType {
            tag: tag.to_string(),
        })?;

        (spec.wire)(input, self)
    }

    /// Parse the node body registered under `tag`.
    pub fn parse_node(
        &self,
        tag: &str,
        name: &str,
        location: TokenLocation,
        parser: &mut TokenParser<'_>,
    ) -> Result<AggregationNode, InternalError> {
        let spec = self
            .get(tag)
            .ok_or_else(|| ParseError::new(location, format!("Unknown aggregation type [{tag}]")))?;

        (spec.text)(name, parser)
    }

    /// Parse a complete `{"<name>": {...}, ...}` request body.
    pub fn parse_aggregations(
        &self,
        src: &str,
        config: &ParseConfig,
    ) -> Result<SubAggregations, InternalError> {
        crate::agg::text::parse_request(src, self, config)
    }

    /// Decode a framed aggregation tree produced by [`crate::agg::encode_aggregations`].
    pub fn decode_aggregations(
        &self,
        bytes: &[u8],
        limits: WireConfig,
    ) -> Result<SubAggregations, InternalError> {
        crate::agg::wire::decode_aggregations(bytes, self, limits)
    }
}

///
/// AggregationRegistryBuilder
///

#[derive(Debug, Default)]
pub struct AggregationRegistryBuilder {
    specs: BTreeMap<&'static str, AggregationSpec>,
}

impl AggregationRegistryBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            specs: BTreeMap::new(),
        }
    }

    /// Start from the built-in kinds.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut specs = BTreeMap::new();
        specs.insert(ChildrenAggregation::SPEC.tag, ChildrenAggregation::SPEC);

        Self { specs }
    }

    /// Add a kind; a tag may be registered once.
    pub fn register(mut self, spec: AggregationSpec) -> Result<Self, InternalError> {
        if self.specs.contains_key(spec.tag) {
            return Err(InternalError::registry_conflict(format!(
                "aggregation type [{}] is already registered",
                spec.tag
            )));
        }
        self.specs.insert(spec.tag, spec);

        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> AggregationRegistry {
        tracing::debug!(
            kinds = self.specs.len(),
            tags = ?self.specs.keys().collect::<Vec<_>>(),
            "aggregation registry built"
        );

        AggregationRegistry { specs: self.specs }
    }
}

/// Process-wide registry of the built-in kinds, initialized on first use.
pub fn default_registry() -> &'static AggregationRegistry {
    static REGISTRY: OnceLock<AggregationRegistry> = OnceLock::new();

    REGISTRY.get_or_init(AggregationRegistry::builtin)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{AggregationRegistry, AggregationSpec, default_registry};
    use crate::{
        agg::children::ChildrenAggregation,
        error::{ErrorClass, ErrorOrigin},
        wire::{StreamInput, WireVersion},
    };

    #[test]
    fn builtin_registry_knows_children() {
        let registry = default_registry();

        assert!(registry.contains("children"));
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["children"]);
        assert!(std::ptr::eq(registry, default_registry()));
    }

    #[test]
    fn duplicate_tag_is_a_conflict() {
        let err = AggregationRegistry::builder()
            .register(ChildrenAggregation::SPEC)
            .and_then(|builder| builder.register(ChildrenAggregation::SPEC))
            .expect_err("second registration must fail");

        assert_eq!(err.class, ErrorClass::Conflict);
        assert_eq!(err.origin, ErrorOrigin::Registry);
        assert!(err.message.contains("[children]"), "unexpected error: {err:?}");
    }

    #[test]
    fn unknown_wire_tag_is_unsupported() {
        let registry = AggregationRegistry::builder().build();
        let mut input = StreamInput::new(&[], WireVersion::CURRENT);

        let err = registry
            .read_node("children", &mut input)
            .expect_err("empty registry must not decode");
        assert_eq!(err.class, ErrorClass::Unsupported);
        assert_eq!(err.origin, ErrorOrigin::Wire);
    }

    #[test]
    fn builtin_builder_accepts_new_kinds() {
        fn never_wire(
            _: &mut StreamInput<'_>,
            _: &AggregationRegistry,
        ) -> Result<crate::agg::AggregationNode, crate::error::InternalError> {
            Err(crate::error::InternalError::invalid_argument("never"))
        }
        fn never_text(
            _: &str,
            _: &mut crate::text::TokenParser<'_>,
        ) -> Result<crate::agg::AggregationNode, crate::error::InternalError> {
            Err(crate::error::InternalError::invalid_argument("never"))
        }

        let registry = super::AggregationRegistryBuilder::with_builtin()
            .register(AggregationSpec {
                tag: "parent",
                wire: never_wire,
                text: never_text,
            })
            .expect("new tag registers")
            .build();

        assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["children", "parent"]);
    }
}
