//! PDF Lexer
//!
//! Tokenizes PDF value syntax according to ISO 32000-1 Section 7.2

use crate::error::{PdfError, Result};

/// PDF Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Boolean: true or false
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Real number
    Real(f64),

    /// Literal string `( ... )`
    String(Vec<u8>),

    /// Hexadecimal string `< ... >`
    HexString(Vec<u8>),

    /// Name object (e.g., /Type), with `#xx` escapes resolved
    Name(Vec<u8>),

    /// Left square bracket [
    ArrayStart,

    /// Right square bracket ]
    ArrayEnd,

    /// Dictionary start <<
    DictStart,

    /// Dictionary end >>
    DictEnd,

    /// Null object
    Null,

    /// Any other bare word, such as `R` or `obj`
    Keyword(String),

    /// Comment (usually ignored)
    Comment(Vec<u8>),

    /// End of input
    Eof,
}

fn is_delimiter(ch: u8) -> bool {
    matches!(
        ch,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

// PDF whitespace includes NUL, which `is_ascii_whitespace` does not.
fn is_whitespace(ch: u8) -> bool {
    ch == 0 || ch.is_ascii_whitespace()
}

/// PDF Lexer over an in-memory buffer
pub struct Lexer<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Rewinds or advances to a position obtained from [`Lexer::position`].
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }

    fn error(&self, message: impl Into<String>) -> PdfError {
        PdfError::parse(self.position, message)
    }

    fn peek_char(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    fn consume_char(&mut self) -> Option<u8> {
        let ch = self.peek_char()?;
        self.position += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(is_whitespace) {
            self.position += 1;
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let ch = match self.peek_char() {
            Some(ch) => ch,
            None => return Ok(Token::Eof),
        };

        match ch {
            b'%' => Ok(self.read_comment()),
            b'/' => self.read_name(),
            b'(' => self.read_literal_string(),
            b'<' => self.read_angle_bracket(),
            b'>' => {
                self.consume_char();
                if self.consume_char() == Some(b'>') {
                    Ok(Token::DictEnd)
                } else {
                    Err(self.error("Expected '>' after '>'"))
                }
            }
            b'[' => {
                self.consume_char();
                Ok(Token::ArrayStart)
            }
            b']' => {
                self.consume_char();
                Ok(Token::ArrayEnd)
            }
            b'+' | b'-' | b'0'..=b'9' | b'.' => self.read_number(),
            _ if !is_delimiter(ch) => Ok(self.read_keyword()),
            _ => Err(self.error(format!("Unexpected character: {}", ch as char))),
        }
    }

    /// Read a comment (from % to end of line)
    fn read_comment(&mut self) -> Token {
        self.consume_char(); // consume '%'
        let start = self.position;
        while self
            .peek_char()
            .is_some_and(|ch| ch != b'\n' && ch != b'\r')
        {
            self.position += 1;
        }
        Token::Comment(self.data[start..self.position].to_vec())
    }

    /// Read a name object (e.g., /Type)
    fn read_name(&mut self) -> Result<Token> {
        self.consume_char(); // consume '/'
        let mut name = Vec::new();

        while let Some(ch) = self.peek_char() {
            if is_whitespace(ch) || is_delimiter(ch) {
                break;
            }
            self.consume_char();

            // Handle hex codes in names (e.g., /A#20B means /A B)
            if ch == b'#' {
                let high = self.consume_char().and_then(hex_digit_value);
                let low = self.consume_char().and_then(hex_digit_value);
                match (high, low) {
                    (Some(high), Some(low)) => name.push((high << 4) | low),
                    _ => return Err(self.error("Invalid hex code in name")),
                }
            } else {
                name.push(ch);
            }
        }

        Ok(Token::Name(name))
    }

    /// Read a literal string (parentheses)
    fn read_literal_string(&mut self) -> Result<Token> {
        self.consume_char(); // consume '('
        let mut string = Vec::new();
        let mut paren_depth = 1;

        loop {
            let ch = self
                .consume_char()
                .ok_or_else(|| self.error("Unterminated string"))?;

            match ch {
                b'\\' => {
                    let escaped = self
                        .consume_char()
                        .ok_or_else(|| self.error("Unterminated string"))?;
                    match escaped {
                        b'n' => string.push(b'\n'),
                        b'r' => string.push(b'\r'),
                        b't' => string.push(b'\t'),
                        b'b' => string.push(0x08),
                        b'f' => string.push(0x0C),
                        b'0'..=b'7' => {
                            // Octal escape sequence
                            let mut value = (escaped - b'0') as u16;
                            for _ in 0..2 {
                                match self.peek_char() {
                                    Some(next @ b'0'..=b'7') => {
                                        self.consume_char();
                                        value = value * 8 + (next - b'0') as u16;
                                    }
                                    _ => break,
                                }
                            }
                            string.push(value as u8);
                        }
                        // Line continuation
                        b'\r' => {
                            if self.peek_char() == Some(b'\n') {
                                self.consume_char();
                            }
                        }
                        b'\n' => {}
                        // Covers \( \) \\ and unknown escapes
                        other => string.push(other),
                    }
                }
                b'(' => {
                    paren_depth += 1;
                    string.push(ch);
                }
                b')' => {
                    paren_depth -= 1;
                    if paren_depth == 0 {
                        break;
                    }
                    string.push(ch);
                }
                _ => string.push(ch),
            }
        }

        Ok(Token::String(string))
    }

    /// Read angle bracket tokens (hex strings or dict markers)
    fn read_angle_bracket(&mut self) -> Result<Token> {
        self.consume_char(); // consume '<'

        if self.peek_char() == Some(b'<') {
            self.consume_char();
            return Ok(Token::DictStart);
        }

        let mut bytes = Vec::new();
        let mut high: Option<u8> = None;
        loop {
            let ch = self
                .consume_char()
                .ok_or_else(|| self.error("Unterminated hex string"))?;
            if ch == b'>' {
                break;
            }
            if is_whitespace(ch) {
                continue;
            }
            let value =
                hex_digit_value(ch).ok_or_else(|| self.error("Invalid character in hex string"))?;
            match high.take() {
                Some(h) => bytes.push((h << 4) | value),
                None => high = Some(value),
            }
        }

        // Pad with 0 if odd number of digits
        if let Some(h) = high {
            bytes.push(h << 4);
        }

        Ok(Token::HexString(bytes))
    }

    /// Read a number (integer or real)
    fn read_number(&mut self) -> Result<Token> {
        let start = self.position;
        let mut has_dot = false;

        if matches!(self.peek_char(), Some(b'+' | b'-')) {
            self.consume_char();
        }

        while let Some(ch) = self.peek_char() {
            match ch {
                b'0'..=b'9' => {
                    self.consume_char();
                }
                b'.' if !has_dot => {
                    self.consume_char();
                    has_dot = true;
                }
                _ => break,
            }
        }

        let text = std::str::from_utf8(&self.data[start..self.position])
            .map_err(|_| self.error("Invalid number"))?;
        // A leading '+' is valid PDF but not accepted by Rust's integer parser
        let text = text.strip_prefix('+').unwrap_or(text);

        if has_dot {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.error(format!("Invalid real number: '{text}'")))?;
            Ok(Token::Real(value))
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| self.error(format!("Invalid integer: '{text}'")))?;
            Ok(Token::Integer(value))
        }
    }

    /// Read a bare word and classify it
    fn read_keyword(&mut self) -> Token {
        let start = self.position;
        while self
            .peek_char()
            .is_some_and(|ch| !is_whitespace(ch) && !is_delimiter(ch))
        {
            self.position += 1;
        }
        let word = String::from_utf8_lossy(&self.data[start..self.position]);
        match word.as_ref() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            _ => Token::Keyword(word.into_owned()),
        }
    }
}

/// Get value of hex digit
fn hex_digit_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        _ => None,
    }
}
