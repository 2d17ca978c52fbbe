//! PDF value parser
//!
//! Reads the textual value grammar produced by [`crate::writer`] back into
//! [`Value`]s. This covers direct objects only; file structure (headers,
//! cross-reference tables, `obj`/`stream` framing) is out of scope.

pub mod lexer;

pub use self::lexer::{Lexer, Token};

use crate::error::{PdfError, Result};
use crate::objects::{Array, Dictionary, Name, ObjectId, PdfString, Value};

/// Nesting limit for arrays and dictionaries.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Parses exactly one value from `data`. Trailing tokens other than
/// comments are an error.
pub fn parse_value(data: &[u8]) -> Result<Value> {
    let mut parser = ValueParser::new(data);
    let value = parser.parse_value()?;
    match parser.next_significant_token()? {
        Token::Eof => Ok(value),
        token => Err(PdfError::parse(
            parser.lexer.position(),
            format!("Trailing data after value: {token:?}"),
        )),
    }
}

/// Recursive-descent parser over a [`Lexer`].
pub struct ValueParser<'a> {
    lexer: Lexer<'a>,
    depth: usize,
}

impl<'a> ValueParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
            depth: 0,
        }
    }

    fn next_significant_token(&mut self) -> Result<Token> {
        loop {
            match self.lexer.next_token()? {
                Token::Comment(_) => continue,
                token => return Ok(token),
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> PdfError {
        PdfError::parse(self.lexer.position(), message)
    }

    /// Parses the next value.
    pub fn parse_value(&mut self) -> Result<Value> {
        let token = self.next_significant_token()?;
        self.parse_from_token(token)
    }

    fn parse_from_token(&mut self, token: Token) -> Result<Value> {
        match token {
            Token::Boolean(b) => Ok(Value::Bool(b)),
            Token::Integer(n) => Ok(self.try_reference(n)?.unwrap_or(Value::Integer(n))),
            Token::Real(r) => Ok(Value::Real(r)),
            Token::String(bytes) => Ok(Value::String(PdfString::new(bytes))),
            Token::HexString(bytes) => Ok(Value::String(PdfString::hex(bytes))),
            Token::Name(bytes) => Ok(Value::Name(name_from_bytes(bytes))),
            Token::Null => Ok(Value::Null),
            Token::ArrayStart => self.nested(Self::parse_array),
            Token::DictStart => self.nested(Self::parse_dictionary),
            Token::Eof => Err(self.error("Unexpected end of input")),
            other => Err(self.error(format!("Unexpected token: {other:?}"))),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Result<Value>) -> Result<Value> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Looks ahead for `<generation> R` after an integer. The lexer is
    /// rewound when the lookahead does not form a reference.
    fn try_reference(&mut self, number: i64) -> Result<Option<Value>> {
        let saved = self.lexer.position();
        let object_number = match u32::try_from(number) {
            Ok(n) => n,
            Err(_) => return Ok(None),
        };

        if let Ok(Token::Integer(generation)) = self.lexer.next_token() {
            if let Ok(generation) = u16::try_from(generation) {
                if matches!(self.lexer.next_token(), Ok(Token::Keyword(ref k)) if k == "R") {
                    return Ok(Some(Value::Reference(ObjectId::new(
                        object_number,
                        generation,
                    ))));
                }
            }
        }

        self.lexer.seek(saved);
        Ok(None)
    }

    fn parse_array(&mut self) -> Result<Value> {
        let mut array = Array::new();
        loop {
            match self.next_significant_token()? {
                Token::ArrayEnd => return Ok(Value::from(array)),
                Token::Eof => return Err(self.error("Unterminated array")),
                token => array.push(self.parse_from_token(token)?),
            }
        }
    }

    fn parse_dictionary(&mut self) -> Result<Value> {
        let mut dict = Dictionary::new();
        loop {
            match self.next_significant_token()? {
                Token::DictEnd => return Ok(Value::from(dict)),
                Token::Name(key) => {
                    let value = self.parse_value()?;
                    dict.set(name_from_bytes(key), value);
                }
                Token::Eof => return Err(self.error("Unterminated dictionary")),
                other => {
                    return Err(self.error(format!("Expected dictionary key, found {other:?}")))
                }
            }
        }
    }
}

fn name_from_bytes(bytes: Vec<u8>) -> Name {
    match String::from_utf8(bytes) {
        Ok(name) => Name::from(name),
        Err(err) => Name::from(String::from_utf8_lossy(err.as_bytes()).into_owned()),
    }
}
