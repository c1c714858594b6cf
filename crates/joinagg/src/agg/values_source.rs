use crate::model::{field::FieldType, index::IndexSchema};
use std::fmt;

///
/// ValuesSourceType
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValuesSourceType {
    Bytes,
    Numeric,
}

impl fmt::Display for ValuesSourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bytes => "bytes",
            Self::Numeric => "numeric",
        };
        write!(f, "{label}")
    }
}

///
/// ValuesSourceConfig
///
/// Where an aggregation reads its values from. `Unmapped` is the
/// "matches nothing" sentinel: the aggregation runs but sees zero values.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValuesSourceConfig {
    Unmapped { value_type: ValuesSourceType },
    Field { field: FieldType },
}

impl ValuesSourceConfig {
    #[must_use]
    pub const fn unmapped(value_type: ValuesSourceType) -> Self {
        Self::Unmapped { value_type }
    }

    /// Read values straight from a mapped field; no script, no missing value.
    #[must_use]
    pub const fn field_only(field: FieldType) -> Self {
        Self::Field { field }
    }

    #[must_use]
    pub const fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped { .. })
    }

    #[must_use]
    pub const fn value_type(&self) -> ValuesSourceType {
        match self {
            Self::Unmapped { value_type } => *value_type,
            Self::Field { field } => field.values_source_type(),
        }
    }

    #[must_use]
    pub const fn field(&self) -> Option<&FieldType> {
        match self {
            Self::Unmapped { .. } => None,
            Self::Field { field } => Some(field),
        }
    }
}

///
/// RegistryKey
///
/// Key under which values-source specific aggregator implementations are
/// looked up. Aggregations that do not specialize per values-source type
/// report [`RegistryKey::UNREGISTERED`].
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RegistryKey(Option<&'static str>);

impl RegistryKey {
    pub const UNREGISTERED: Self = Self(None);

    #[must_use]
    pub const fn is_registered(self) -> bool {
        self.0.is_some()
    }
}

///
/// AggregationContext
///
/// Per-search view of the index being aggregated. Built fresh for every
/// search (and every index of a cross-index search).
///

#[derive(Clone, Copy, Debug)]
pub struct AggregationContext<'a> {
    schema: &'a IndexSchema,
}

impl<'a> AggregationContext<'a> {
    #[must_use]
    pub const fn new(schema: &'a IndexSchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub const fn schema(&self) -> &'a IndexSchema {
        self.schema
    }

    #[must_use]
    pub fn index_name(&self) -> &'a str {
        self.schema.index_name()
    }
}
