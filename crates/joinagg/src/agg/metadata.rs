use crate::error::InternalError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
};
use thiserror::Error as ThisError;

///
/// Metadata
///
/// Opaque key/value mapping attached to an aggregation and echoed back
/// unchanged with its results.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect::<Map<_, _>>(),
        )
    }

    /// Convert a JSON object into metadata; `None` when `value` is not an object.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        value.as_object().map(|map| {
            Self(
                map.iter()
                    .map(|(k, v)| (k.clone(), MetaValue::from_json(v)))
                    .collect(),
            )
        })
    }
}

///
/// MetaValue
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(FiniteFloat),
    Text(String),
    List(Vec<Self>),
    Map(BTreeMap<String, Self>),
}

impl MetaValue {
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::Int(v) => JsonValue::Number((*v).into()),
            Self::Float(v) => JsonValue::from(v.get()),
            Self::Text(v) => JsonValue::String(v.clone()),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    #[must_use]
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(v) => Self::Bool(*v),
            JsonValue::Number(n) => match n.as_i64() {
                Some(v) => Self::Int(v),
                None => n
                    .as_f64()
                    .and_then(|v| FiniteFloat::new(v).ok())
                    .map_or(Self::Null, Self::Float),
            },
            JsonValue::String(v) => Self::Text(v.clone()),
            JsonValue::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

///
/// FiniteFloat
///
/// Metadata float. NaN and infinities have no JSON form, so they are refused
/// on construction and on wire decode. Compares and hashes by bit pattern.
///

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct FiniteFloat(f64);

impl FiniteFloat {
    pub const fn new(value: f64) -> Result<Self, NonFiniteFloat> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(NonFiniteFloat(value))
        }
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for FiniteFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FiniteFloat {}

impl Hash for FiniteFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for FiniteFloat {
    type Error = NonFiniteFloat;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FiniteFloat> for f64 {
    fn from(value: FiniteFloat) -> Self {
        value.0
    }
}

///
/// NonFiniteFloat
///

#[derive(Clone, Copy, Debug, ThisError)]
#[error("metadata floats must be finite, got {0}")]
pub struct NonFiniteFloat(pub f64);

impl From<NonFiniteFloat> for InternalError {
    fn from(err: NonFiniteFloat) -> Self {
        Self::invalid_argument(err.to_string())
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<FiniteFloat> for MetaValue {
    fn from(v: FiniteFloat) -> Self {
        Self::Float(v)
    }
}

impl TryFrom<f64> for MetaValue {
    type Error = NonFiniteFloat;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        FiniteFloat::new(v).map(Self::Float)
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{FiniteFloat, MetaValue, Metadata};
    use crate::{
        error::ErrorClass,
        serialize::{deserialize_bounded, serialize},
    };
    use serde_json::json;
    use std::{
        collections::{BTreeMap, hash_map::DefaultHasher},
        hash::{Hash, Hasher},
    };

    fn float(v: f64) -> MetaValue {
        MetaValue::try_from(v).expect("finite float")
    }

    fn hash_of(value: &impl Hash) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(float(2.5), float(2.5));
        assert_ne!(float(0.0), float(-0.0));
        assert_ne!(MetaValue::Int(1), float(1.0));
        assert_eq!(hash_of(&float(2.5)), hash_of(&float(2.5)));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(FiniteFloat::new(v).is_err(), "{v} must be rejected");

            let err: crate::error::InternalError =
                MetaValue::try_from(v).expect_err("non-finite float").into();
            assert_eq!(err.class, ErrorClass::InvalidArgument);
        }
    }

    #[test]
    fn floats_keep_their_value_through_json() {
        let metadata = Metadata::new()
            .with("ratio", float(0.25))
            .with("big", float(-1.5e300))
            .with("nested", MetaValue::List(vec![float(3.5), MetaValue::Null]));

        assert_eq!(Metadata::from_json(&metadata.to_json()), Some(metadata));
    }

    #[test]
    fn cbor_blob_with_nan_is_refused() {
        let forged = BTreeMap::from([("r", BTreeMap::from([("Float", f64::NAN)]))]);
        let blob = serialize(&forged).expect("encode forged blob");
        let err = deserialize_bounded::<Metadata>(&blob, 256).expect_err("nan must not decode");

        assert!(err.is_corruption(), "{err:?}");

        let honest = BTreeMap::from([("r", BTreeMap::from([("Float", 0.5_f64)]))]);
        let blob = serialize(&honest).expect("encode blob");
        let metadata = deserialize_bounded::<Metadata>(&blob, 256).expect("finite float decodes");
        assert_eq!(metadata.get("r"), Some(&float(0.5)));
    }

    #[test]
    fn json_conversion_keeps_integer_and_float_apart() {
        let source = json!({"owner": "ops", "weight": 3, "ratio": 0.5, "tags": ["a", null]});
        let metadata = Metadata::from_json(&source).expect("object converts");

        assert_eq!(metadata.get("weight"), Some(&MetaValue::Int(3)));
        assert_eq!(metadata.get("ratio"), Some(&float(0.5)));
        assert_eq!(
            metadata.get("tags"),
            Some(&MetaValue::List(vec![MetaValue::Text("a".into()), MetaValue::Null]))
        );
        assert_eq!(metadata.to_json(), source);
    }

    #[test]
    fn non_object_json_is_not_metadata() {
        assert!(Metadata::from_json(&json!(["a"])).is_none());
        assert!(Metadata::from_json(&json!("a")).is_none());
    }

    #[test]
    fn insertion_order_does_not_affect_identity() {
        let a = Metadata::new().with("x", 1_i64).with("y", "z");
        let b = Metadata::new().with("y", "z").with("x", 1_i64);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
