//! Request-level aggregation grammar.
//!
//! ```json
//! {
//!   "<name>": {
//!     "meta": { ... },
//!     "<type>": { ...node body... },
//!     "aggregations": { "<name>": { ... } }
//!   }
//! }
//! ```
//!
//! The node body is handed to the reader registered for `<type>`; this
//! module owns names, `meta`, nesting, and sibling uniqueness.

use crate::{
    agg::{
        AggregationNode,
        base::{self, AGGREGATIONS_FIELD, AGGREGATIONS_FIELD_SHORT, META_FIELD},
        metadata::Metadata,
        registry::AggregationRegistry,
        tree::SubAggregations,
    },
    config::ParseConfig,
    error::InternalError,
    text::{ParseError, Token, TokenLocation, TokenParser},
};

/// Parse a whole request body holding one aggregations object.
pub(crate) fn parse_request(
    src: &str,
    registry: &AggregationRegistry,
    config: &ParseConfig,
) -> Result<SubAggregations, InternalError> {
    let mut parser = TokenParser::with_config(src, config)?;

    match parser.next_token()? {
        Some(Token::StartObject) => {}
        Some(other) => {
            return Err(ParseError::new(
                parser.token_location(),
                format!("Expected [START_OBJECT] but found [{other}]"),
            )
            .into());
        }
        None => {
            return Err(
                ParseError::new(parser.token_location(), "request body is empty").into(),
            );
        }
    }

    let aggregations = parse_aggregations(&mut parser, registry, config)?;
    if parser.next_token()?.is_some() {
        return Err(ParseError::new(
            parser.token_location(),
            "unexpected content after the aggregations object",
        )
        .into());
    }

    Ok(aggregations)
}

/// Parse the aggregations object whose `START_OBJECT` is the current token.
/// Returns with the matching `END_OBJECT` consumed.
pub fn parse_aggregations(
    parser: &mut TokenParser<'_>,
    registry: &AggregationRegistry,
    config: &ParseConfig,
) -> Result<SubAggregations, InternalError> {
    parse_level(parser, registry, config, 1)
}

fn parse_level(
    parser: &mut TokenParser<'_>,
    registry: &AggregationRegistry,
    config: &ParseConfig,
    level: usize,
) -> Result<SubAggregations, InternalError> {
    if level > config.max_depth {
        return Err(ParseError::new(
            parser.token_location(),
            format!("aggregation tree exceeds maximum depth {}", config.max_depth),
        )
        .into());
    }

    let mut out = SubAggregations::new();

    loop {
        match parser.next_token_required()? {
            Token::EndObject => break,
            Token::FieldName => {}
            other => {
                return Err(ParseError::new(
                    parser.token_location(),
                    format!(
                        "Unexpected token {other} in [aggregations]: aggregations definitions must start with the name of the aggregation."
                    ),
                )
                .into());
            }
        }

        let name = parser.current_name().unwrap_or_default().to_string();
        let name_location = parser.token_location();
        validate_name(&name, name_location)?;

        let token = parser.next_token_required()?;
        if token != Token::StartObject {
            return Err(ParseError::new(
                parser.token_location(),
                format!(
                    "Aggregation definition for [{name}] starts with a [{token}], expected a [START_OBJECT]."
                ),
            )
            .into());
        }

        let node = parse_definition(parser, registry, config, level, &name, name_location)?;
        out.add(node).map_err(|_| {
            ParseError::new(
                name_location,
                format!("Two sibling aggregations cannot have the same name: [{name}]"),
            )
        })?;
    }

    Ok(out)
}

// One `{"meta": .., "<type>": .., "aggregations": ..}` definition.
fn parse_definition(
    parser: &mut TokenParser<'_>,
    registry: &AggregationRegistry,
    config: &ParseConfig,
    level: usize,
    name: &str,
    name_location: TokenLocation,
) -> Result<AggregationNode, InternalError> {
    let mut node = None;
    let mut metadata = None;
    let mut sub_aggregations = None;

    loop {
        match parser.next_token_required()? {
            Token::EndObject => break,
            Token::FieldName => {}
            other => {
                return Err(ParseError::new(
                    parser.token_location(),
                    format!(
                        "Expected [FIELD_NAME] under [START_OBJECT], but got a [{other}] in [{name}]"
                    ),
                )
                .into());
            }
        }

        let field = parser.current_name().unwrap_or_default().to_string();
        let field_location = parser.token_location();

        let token = parser.next_token_required()?;
        if token != Token::StartObject {
            return Err(ParseError::new(
                parser.token_location(),
                format!("Expected [START_OBJECT] under [{field}], but got a [{token}] in [{name}]"),
            )
            .into());
        }

        match field.as_str() {
            META_FIELD => {
                if metadata.is_some() {
                    return Err(ParseError::new(
                        field_location,
                        format!("Found two meta definitions in [{name}]"),
                    )
                    .into());
                }
                let tree = parser.read_tree()?;
                metadata = Metadata::from_json(&tree);
            }
            AGGREGATIONS_FIELD | AGGREGATIONS_FIELD_SHORT => {
                if sub_aggregations.is_some() {
                    return Err(ParseError::new(
                        field_location,
                        format!("Found two sub aggregation definitions under [{name}]"),
                    )
                    .into());
                }
                sub_aggregations = Some(parse_level(parser, registry, config, level + 1)?);
            }
            tag => {
                if let Some(existing) = node.as_ref().map(AggregationNode::aggregation_type) {
                    return Err(ParseError::new(
                        field_location,
                        format!(
                            "Found two aggregation type definitions in [{name}]: [{existing}] and [{tag}]"
                        ),
                    )
                    .into());
                }
                node = Some(registry.parse_node(tag, name, field_location, parser)?);
            }
        }
    }

    let node = node.ok_or_else(|| {
        ParseError::new(
            name_location,
            format!("Missing definition for aggregation [{name}]"),
        )
    })?;

    Ok(node.shallow_copy(sub_aggregations.unwrap_or_default(), metadata))
}

fn validate_name(name: &str, location: TokenLocation) -> Result<(), ParseError> {
    base::validate_name(name).map_err(|message| ParseError::new(location, message))
}
