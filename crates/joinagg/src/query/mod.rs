//! Immutable document-selection predicates handed to the execution engine.

use std::fmt;

///
/// TermQuery
///
/// Matches documents whose `field` holds exactly `value`. Instances are
/// shared behind `Arc` once built and never mutated.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TermQuery {
    field: String,
    value: String,
}

impl TermQuery {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for TermQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.value)
    }
}
