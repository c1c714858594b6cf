use crate::agg::ValuesSourceType;
use std::fmt;

///
/// FieldType
/// Mapped field metadata used by values-source resolution.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FieldType {
    name: String,
    kind: FieldKind,
}

impl FieldType {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Values-source family this field feeds when aggregated.
    #[must_use]
    pub const fn values_source_type(&self) -> ValuesSourceType {
        self.kind.values_source_type()
    }
}

///
/// FieldKind
///
/// Minimal mapping surface: keyword-like fields aggregate as bytes, numeric
/// fields as numbers. Join fields store the relation name as a keyword.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FieldKind {
    Keyword,
    Long,
    Join,
}

impl FieldKind {
    #[must_use]
    pub const fn values_source_type(self) -> ValuesSourceType {
        match self {
            Self::Keyword | Self::Join => ValuesSourceType::Bytes,
            Self::Long => ValuesSourceType::Numeric,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Keyword => "keyword",
            Self::Long => "long",
            Self::Join => "join",
        };
        write!(f, "{label}")
    }
}
