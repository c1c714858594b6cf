use crate::{
    agg::{
        AggregationNode, base::AggregationBase, children::ChildrenAggregation,
        registry::AggregationRegistry,
    },
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    text::{ParseError, Token, TokenParser},
    wire::{StreamInput, StreamOutput, WireError},
};
use serde_json::{Map, Value as JsonValue};

impl ChildrenAggregation {
    // ------------------------------------------------------------------
    // Wire
    // ------------------------------------------------------------------

    /// Base fields, then `child_type`. Resolved filters are never written.
    pub fn write_to(&self, out: &mut StreamOutput) -> Result<(), InternalError> {
        self.base.write_to(out)?;
        out.write_string(&self.child_type)?;

        Ok(())
    }

    pub fn read_from(
        input: &mut StreamInput<'_>,
        registry: &AggregationRegistry,
    ) -> Result<Self, InternalError> {
        let base = AggregationBase::read_from(input, registry)?;
        let child_type = input.read_string()?;
        if child_type.is_empty() {
            return Err(WireError::InvalidPayload(format!(
                "children aggregation [{}] has an empty child type",
                base.name()
            ))
            .into());
        }

        tracing::trace!(
            aggregation = base.name(),
            child_type = %child_type,
            version = %input.version(),
            "children aggregation decoded"
        );
        sink::record(MetricsEvent::WireDecoded {
            aggregation_type: Self::NAME,
        });

        Ok(Self { base, child_type })
    }

    pub(super) fn read_node(
        input: &mut StreamInput<'_>,
        registry: &AggregationRegistry,
    ) -> Result<AggregationNode, InternalError> {
        Self::read_from(input, registry).map(AggregationNode::Children)
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Node body: `{"type": "<child_type>"}`.
    #[must_use]
    pub fn to_text(&self) -> JsonValue {
        let mut body = Map::new();
        body.insert(
            Self::TYPE_FIELD.to_string(),
            JsonValue::String(self.child_type.clone()),
        );

        JsonValue::Object(body)
    }

    /// Whole definition, as it appears under the aggregation name.
    #[must_use]
    pub fn definition_text(&self) -> JsonValue {
        self.base.wrap_text(Self::NAME, self.to_text())
    }

    /// Parse the node body. The parser sits on the body's `START_OBJECT`
    /// and is left on its matching `END_OBJECT`.
    pub fn parse(name: &str, parser: &mut TokenParser<'_>) -> Result<Self, InternalError> {
        let mut current_field: Option<String> = None;
        let mut child_type: Option<String> = None;

        loop {
            let token = parser.next_token_required()?;
            match token {
                Token::EndObject => break,
                Token::FieldName => {
                    current_field = parser.current_name().map(ToOwned::to_owned);
                }
                Token::ValueString => {
                    let field = current_field.as_deref().unwrap_or_default();
                    if field != Self::TYPE_FIELD {
                        return Err(ParseError::new(
                            parser.token_location(),
                            format!("Unknown key for a {token} in [{name}]: [{field}]."),
                        )
                        .into());
                    }
                    child_type = parser.text().map(ToOwned::to_owned);
                }
                other => {
                    return Err(ParseError::new(
                        parser.token_location(),
                        format!("Unexpected token {other} in [{name}]."),
                    )
                    .into());
                }
            }
        }

        let Some(child_type) = child_type else {
            return Err(ParseError::new(
                parser.token_location(),
                format!("Missing [child_type] field for children aggregation [{name}]"),
            )
            .into());
        };

        let agg = Self::try_new(name, &child_type)?;
        sink::record(MetricsEvent::TextParsed {
            aggregation_type: Self::NAME,
        });

        Ok(agg)
    }

    pub(super) fn parse_node(
        name: &str,
        parser: &mut TokenParser<'_>,
    ) -> Result<AggregationNode, InternalError> {
        Self::parse(name, parser).map(AggregationNode::Children)
    }
}
