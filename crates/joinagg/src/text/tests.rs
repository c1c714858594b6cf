use super::{ParseError, Token, TokenLocation, TokenParser};
use crate::config::ParseConfig;
use serde_json::json;

fn tokens(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut parser = TokenParser::new(src)?;
    let mut out = Vec::new();
    while let Some(token) = parser.next_token()? {
        out.push(token);
    }

    Ok(out)
}

#[test]
fn object_body_streams_field_and_value_tokens() {
    let mut parser = TokenParser::new(r#"{ "type": "comment" }"#).expect("parser should build");

    assert_eq!(parser.next_token(), Ok(Some(Token::StartObject)));
    assert_eq!(parser.next_token(), Ok(Some(Token::FieldName)));
    assert_eq!(parser.current_name(), Some("type"));
    assert_eq!(parser.token_location(), TokenLocation::new(1, 3));
    assert_eq!(parser.next_token(), Ok(Some(Token::ValueString)));
    assert_eq!(parser.text(), Some("comment"));
    assert_eq!(parser.token_location(), TokenLocation::new(1, 11));
    assert_eq!(parser.next_token(), Ok(Some(Token::EndObject)));
    assert_eq!(parser.next_token(), Ok(None));
}

#[test]
fn nested_structures_produce_balanced_tokens() {
    let got = tokens(r#"{"a": [1, true, null, {"b": "c"}], "d": {}}"#).expect("valid json");

    assert_eq!(
        got,
        vec![
            Token::StartObject,
            Token::FieldName,
            Token::StartArray,
            Token::ValueNumber,
            Token::ValueBoolean,
            Token::ValueNull,
            Token::StartObject,
            Token::FieldName,
            Token::ValueString,
            Token::EndObject,
            Token::EndArray,
            Token::FieldName,
            Token::StartObject,
            Token::EndObject,
            Token::EndObject,
        ]
    );
}

#[test]
fn locations_track_lines_and_columns() {
    let mut parser = TokenParser::new("{\n  \"type\":\n    5\n}").expect("parser should build");
    parser.next_token().expect("start object");
    parser.next_token().expect("field name");
    assert_eq!(parser.token_location(), TokenLocation::new(2, 3));

    parser.next_token().expect("number");
    assert_eq!(parser.token_location(), TokenLocation::new(3, 5));
    assert_eq!(parser.number().and_then(serde_json::Number::as_i64), Some(5));
}

#[test]
fn string_escapes_are_decoded() {
    let mut parser = TokenParser::new(r#""a\"bé\n""#).expect("parser should build");
    assert_eq!(parser.next_token(), Ok(Some(Token::ValueString)));
    assert_eq!(parser.text(), Some("a\"bé\n"));
}

#[test]
fn structural_errors_point_at_the_offending_character() {
    let err = tokens(r#"{"a" 1}"#).expect_err("missing colon");
    assert_eq!(err.location(), TokenLocation::new(1, 6));

    let err = tokens(r#"{"a": 1,}"#).expect_err("trailing comma");
    assert_eq!(err.location(), TokenLocation::new(1, 9));

    let err = tokens("[1 2]").expect_err("missing comma");
    assert!(err.message().contains("expected ','"), "unexpected: {err}");

    let err = tokens(r#"{"a": tru}"#).expect_err("bad literal");
    assert!(err.message().contains("unrecognized literal"), "unexpected: {err}");

    let err = tokens(r#"{"a": 01}"#).expect_err("leading zero");
    assert!(err.message().contains("invalid number"), "unexpected: {err}");
}

#[test]
fn unterminated_input_is_rejected() {
    let err = tokens(r#"{"a": "b"#).expect_err("unterminated string");
    assert_eq!(err.message(), "unterminated string");

    let err = tokens(r#"{"a": "b""#).expect_err("missing close brace");
    assert!(err.message().contains("expected ','"), "unexpected: {err}");
}

#[test]
fn content_after_document_is_rejected() {
    let err = tokens("{} {}").expect_err("two documents");
    assert_eq!(err.location(), TokenLocation::new(1, 4));
}

#[test]
fn read_tree_collects_nested_values_in_order() {
    let mut parser =
        TokenParser::new(r#"{"z": 1, "a": [1.5, "x", false], "m": {"k": null}}"#).expect("build");
    parser.next_token().expect("start object");

    let tree = parser.read_tree().expect("tree should read");
    assert_eq!(
        tree,
        json!({"z": 1, "a": [1.5, "x", false], "m": {"k": null}})
    );
    assert_eq!(
        tree.as_object()
            .map(|map| map.keys().cloned().collect::<Vec<_>>()),
        Some(vec!["z".to_string(), "a".to_string(), "m".to_string()])
    );
    assert_eq!(parser.next_token(), Ok(None));
}

#[test]
fn read_tree_rejects_duplicate_keys() {
    let mut parser = TokenParser::new(r#"{"a": 1, "a": 2}"#).expect("build");
    parser.next_token().expect("start object");

    let err = parser.read_tree().expect_err("duplicate key");
    assert_eq!(err.message(), "Duplicate field [a]");
    assert_eq!(err.location(), TokenLocation::new(1, 10));
}

#[test]
fn oversized_input_is_rejected_up_front() {
    let config = ParseConfig {
        max_input_bytes: 8,
        ..ParseConfig::default()
    };
    let err = TokenParser::with_config(r#"{"type": "comment"}"#, &config)
        .expect_err("input over the limit");

    assert!(err.message().contains("exceeds limit 8"), "unexpected: {err}");
}
