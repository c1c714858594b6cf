use crate::{
    config::ParseConfig,
    text::{ParseError, Token, TokenLocation},
};
use serde_json::{Map, Number, Value as JsonValue};

// Structural nesting bound, independent of the aggregation-depth policy.
const MAX_NESTING_DEPTH: usize = 256;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slot {
    Start,
    Value,
    AfterValue,
}

#[derive(Clone, Copy, Debug)]
enum Frame {
    Object(Slot),
    Array(Slot),
}

#[derive(Debug)]
enum Scalar {
    None,
    Text(String),
    Number(Number),
    Bool(bool),
}

///
/// TokenParser
///
/// Single-pass pull parser over a JSON document. Each call to
/// [`TokenParser::next_token`] consumes exactly one token; grammar errors are
/// reported at the offending position instead of being skipped.
///
/// Scalar payloads (string escapes, number syntax) are decoded with
/// `serde_json` so they follow the exact JSON rules.
///

#[derive(Debug)]
pub struct TokenParser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    stack: Vec<Frame>,
    root_done: bool,
    token: Option<Token>,
    location: TokenLocation,
    name: Option<String>,
    scalar: Scalar,
}

impl<'a> TokenParser<'a> {
    pub fn new(src: &'a str) -> Result<Self, ParseError> {
        Self::with_config(src, &ParseConfig::default())
    }

    pub fn with_config(src: &'a str, config: &ParseConfig) -> Result<Self, ParseError> {
        let start = TokenLocation::new(1, 1);
        if src.len() > config.max_input_bytes {
            return Err(ParseError::new(
                start,
                format!(
                    "request body of {} bytes exceeds limit {}",
                    src.len(),
                    config.max_input_bytes
                ),
            ));
        }

        Ok(Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            stack: Vec::new(),
            root_done: false,
            token: None,
            location: start,
            name: None,
            scalar: Scalar::None,
        })
    }

    #[must_use]
    pub const fn current_token(&self) -> Option<Token> {
        self.token
    }

    /// Location of the first character of the current token.
    #[must_use]
    pub const fn token_location(&self) -> TokenLocation {
        self.location
    }

    /// Most recent field name read at any level.
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// String payload of the current `VALUE_STRING` token.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match (&self.token, &self.scalar) {
            (Some(Token::ValueString), Scalar::Text(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn number(&self) -> Option<&Number> {
        match (&self.token, &self.scalar) {
            (Some(Token::ValueNumber), Scalar::Number(number)) => Some(number),
            _ => None,
        }
    }

    #[must_use]
    pub const fn boolean(&self) -> Option<bool> {
        match (&self.token, &self.scalar) {
            (Some(Token::ValueBoolean), Scalar::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Advance one token; `None` once the document is complete.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_whitespace();
        self.location = self.here();
        self.scalar = Scalar::None;

        let token = match self.stack.last().copied() {
            None if self.root_done || self.peek().is_none() => {
                if self.peek().is_some() {
                    return Err(self.error("unexpected content after the end of the document"));
                }
                self.token = None;
                return Ok(None);
            }
            None => self.value()?,
            Some(Frame::Object(slot)) => self.object_token(slot)?,
            Some(Frame::Array(slot)) => self.array_token(slot)?,
        };

        if self.stack.is_empty() {
            self.root_done = true;
        }
        self.token = Some(token);

        Ok(Some(token))
    }

    /// Advance one token, treating end of input as an error.
    pub fn next_token_required(&mut self) -> Result<Token, ParseError> {
        self.next_token()?
            .ok_or_else(|| self.error("unexpected end of input"))
    }

    /// Consume the value starting at the current token into a JSON tree.
    pub fn read_tree(&mut self) -> Result<JsonValue, ParseError> {
        match self.token {
            Some(Token::StartObject) => {
                let mut map = Map::new();
                loop {
                    match self.next_token_required()? {
                        Token::EndObject => return Ok(JsonValue::Object(map)),
                        Token::FieldName => {
                            let key = self.name.clone().unwrap_or_default();
                            let location = self.location;
                            self.next_token_required()?;
                            let value = self.read_tree()?;
                            if map.insert(key.clone(), value).is_some() {
                                return Err(ParseError::new(
                                    location,
                                    format!("Duplicate field [{key}]"),
                                ));
                            }
                        }
                        other => return Err(self.unexpected(other)),
                    }
                }
            }
            Some(Token::StartArray) => {
                let mut items = Vec::new();
                loop {
                    match self.next_token_required()? {
                        Token::EndArray => return Ok(JsonValue::Array(items)),
                        _ => items.push(self.read_tree()?),
                    }
                }
            }
            Some(Token::ValueString) => Ok(JsonValue::String(
                self.text().map(ToOwned::to_owned).unwrap_or_default(),
            )),
            Some(Token::ValueNumber) => Ok(self
                .number()
                .cloned()
                .map_or(JsonValue::Null, JsonValue::Number)),
            Some(Token::ValueBoolean) => Ok(JsonValue::Bool(self.boolean().unwrap_or_default())),
            Some(Token::ValueNull) => Ok(JsonValue::Null),
            Some(other) => Err(self.unexpected(other)),
            None => Err(self.error("expected a value")),
        }
    }

    fn unexpected(&self, token: Token) -> ParseError {
        ParseError::new(self.location, format!("Unexpected token {token}"))
    }

    // ------------------------------------------------------------------
    // Grammar
    // ------------------------------------------------------------------

    fn object_token(&mut self, slot: Slot) -> Result<Token, ParseError> {
        match slot {
            Slot::Start => match self.peek() {
                Some('}') => Ok(self.close()),
                Some('"') => self.field_name(),
                _ => Err(self.error("expected a field name or '}'")),
            },
            Slot::AfterValue => match self.peek() {
                Some('}') => Ok(self.close()),
                Some(',') => {
                    self.bump();
                    self.skip_whitespace();
                    self.location = self.here();
                    if self.peek() == Some('"') {
                        self.field_name()
                    } else {
                        Err(self.error("expected a field name after ','"))
                    }
                }
                _ => Err(self.error("expected ',' or '}'")),
            },
            Slot::Value => {
                self.set_slot(Slot::AfterValue);
                self.value()
            }
        }
    }

    fn array_token(&mut self, slot: Slot) -> Result<Token, ParseError> {
        match (slot, self.peek()) {
            (Slot::Start | Slot::AfterValue, Some(']')) => Ok(self.close()),
            (Slot::AfterValue, Some(',')) => {
                self.bump();
                self.skip_whitespace();
                self.location = self.here();
                self.value()
            }
            (Slot::AfterValue, _) => Err(self.error("expected ',' or ']'")),
            (Slot::Start | Slot::Value, _) => {
                self.set_slot(Slot::AfterValue);
                self.value()
            }
        }
    }

    fn field_name(&mut self) -> Result<Token, ParseError> {
        let name = self.string()?;
        self.skip_whitespace();
        if self.peek() != Some(':') {
            return Err(self.error(format!("expected ':' after field name [{name}]")));
        }
        self.bump();
        self.name = Some(name);
        self.set_slot(Slot::Value);

        Ok(Token::FieldName)
    }

    fn value(&mut self) -> Result<Token, ParseError> {
        match self.peek() {
            Some('{') => {
                self.open(Frame::Object(Slot::Start))?;
                Ok(Token::StartObject)
            }
            Some('[') => {
                self.open(Frame::Array(Slot::Start))?;
                Ok(Token::StartArray)
            }
            Some('"') => {
                let text = self.string()?;
                self.scalar = Scalar::Text(text);
                Ok(Token::ValueString)
            }
            Some('t') => self.literal("true", Token::ValueBoolean, Scalar::Bool(true)),
            Some('f') => self.literal("false", Token::ValueBoolean, Scalar::Bool(false)),
            Some('n') => self.literal("null", Token::ValueNull, Scalar::None),
            Some(c) if c == '-' || c.is_ascii_digit() => self.number_literal(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn open(&mut self, frame: Frame) -> Result<(), ParseError> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(self.error(format!(
                "document nesting exceeds maximum depth {MAX_NESTING_DEPTH}"
            )));
        }
        self.bump();
        self.stack.push(frame);

        Ok(())
    }

    fn close(&mut self) -> Token {
        self.bump();
        match self.stack.pop() {
            Some(Frame::Array(_)) => Token::EndArray,
            _ => Token::EndObject,
        }
    }

    fn set_slot(&mut self, slot: Slot) {
        if let Some(frame) = self.stack.last_mut() {
            *frame = match frame {
                Frame::Object(_) => Frame::Object(slot),
                Frame::Array(_) => Frame::Array(slot),
            };
        }
    }

    // ------------------------------------------------------------------
    // Lexing
    // ------------------------------------------------------------------

    fn string(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let location = self.here();
        self.bump();

        loop {
            match self.bump() {
                None => return Err(ParseError::new(location, "unterminated string")),
                Some('"') => break,
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(ParseError::new(location, "unterminated string"));
                    }
                }
                Some(c) if c < ' ' => {
                    return Err(self.error("control character in string literal"));
                }
                Some(_) => {}
            }
        }

        serde_json::from_str::<String>(&self.src[start..self.pos])
            .map_err(|err| ParseError::new(location, format!("invalid string literal: {err}")))
    }

    fn number_literal(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.bump();
        }

        let raw = &self.src[start..self.pos];
        let number = serde_json::from_str::<Number>(raw)
            .map_err(|_| ParseError::new(self.location, format!("invalid number [{raw}]")))?;
        self.scalar = Scalar::Number(number);

        Ok(Token::ValueNumber)
    }

    fn literal(&mut self, word: &str, token: Token, scalar: Scalar) -> Result<Token, ParseError> {
        let rest = &self.src[self.pos..];
        let boundary_ok = rest
            .get(word.len()..)
            .and_then(|tail| tail.chars().next())
            .is_none_or(|c| !c.is_ascii_alphanumeric());

        if !rest.starts_with(word) || !boundary_ok {
            return Err(self.error("unrecognized literal"));
        }
        for _ in 0..word.len() {
            self.bump();
        }
        self.scalar = scalar;

        Ok(token)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(c)
    }

    const fn here(&self) -> TokenLocation {
        TokenLocation::new(self.line, self.column)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.here(), message)
    }
}
