//! JSON lexer producing position-annotated tokens.
//!
//! Tokenizes RFC 8259 JSON text for the recursive descent parser. Each
//! token carries the source span it was read from. Whitespace (space, tab,
//! CR, LF) is consumed silently; a line feed increments the line counter
//! and resets the column.

use crate::error::SyntaxError;
use crate::position::{Position, Span};

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Null literal
    Null,
    /// Boolean literal
    Boolean(bool),
    /// Number literal: raw source text plus the parsed value
    Number { raw: String, value: f64 },
    /// String literal (unescaped)
    String(String),
    /// Left brace `{`
    BeginObject,
    /// Right brace `}`
    EndObject,
    /// Left bracket `[`
    BeginArray,
    /// Right bracket `]`
    EndArray,
    /// Colon `:`
    Colon,
    /// Comma `,`
    Comma,
    /// End of input
    Eof,
}

/// A lexed token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// JSON lexer that walks the input bytes, tracking line, column and offset.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input: input.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    /// The current position in the input.
    #[must_use]
    pub fn position(&self) -> Position {
        Position { line: self.line, column: self.column, offset: self.pos }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Consume and return the current byte, updating line and column.
    /// Columns count characters, so UTF-8 continuation bytes don't advance
    /// the column.
    fn advance(&mut self) -> Option<u8> {
        let b = self.input.get(self.pos).copied();
        if let Some(b) = b {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                self.column += 1;
            }
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>, position: Position) -> SyntaxError {
        SyntaxError::new(message, position)
    }

    /// Read the next token from the input.
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();
        let start = self.position();

        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(b'{') => {
                self.advance();
                TokenKind::BeginObject
            }
            Some(b'}') => {
                self.advance();
                TokenKind::EndObject
            }
            Some(b'[') => {
                self.advance();
                TokenKind::BeginArray
            }
            Some(b']') => {
                self.advance();
                TokenKind::EndArray
            }
            Some(b':') => {
                self.advance();
                TokenKind::Colon
            }
            Some(b',') => {
                self.advance();
                TokenKind::Comma
            }
            Some(b'"') => self.read_string()?,
            Some(b'-' | b'0'..=b'9') => self.read_number()?,
            Some(b't') => {
                self.expect_keyword(b"true")?;
                TokenKind::Boolean(true)
            }
            Some(b'f') => {
                self.expect_keyword(b"false")?;
                TokenKind::Boolean(false)
            }
            Some(b'n') => {
                self.expect_keyword(b"null")?;
                TokenKind::Null
            }
            Some(b) => {
                let display = if b.is_ascii_graphic() {
                    format!("'{}'", b as char)
                } else {
                    format!("byte 0x{b:02x}")
                };
                return Err(self.error(format!("unexpected character {display}"), start));
            }
        };

        Ok(Token { kind, span: Span { start, end: self.position() } })
    }

    /// Read a string token, unescaping as it goes.
    fn read_string(&mut self) -> Result<TokenKind, SyntaxError> {
        let open = self.position();
        self.advance();

        let mut buf: Vec<u8> = Vec::new();
        loop {
            let at = self.position();
            match self.advance() {
                None => return Err(self.error("unterminated string", open)),
                Some(b'"') => break,
                Some(b'\\') => {
                    let ch = self.read_escape(at)?;
                    let mut utf8 = [0u8; 4];
                    buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                }
                Some(b) if b < 0x20 => {
                    return Err(self.error("control character in string", at));
                }
                Some(b) => buf.push(b),
            }
        }

        // The input is a &str, so raw bytes copied through are valid UTF-8.
        let text = String::from_utf8(buf)
            .map_err(|_| self.error("invalid utf-8 sequence in string", open))?;
        Ok(TokenKind::String(text))
    }

    /// Read the escape sequence after a backslash.
    fn read_escape(&mut self, at: Position) -> Result<char, SyntaxError> {
        match self.advance() {
            None => Err(self.error("unterminated escape sequence", at)),
            Some(b'"') => Ok('"'),
            Some(b'\\') => Ok('\\'),
            Some(b'/') => Ok('/'),
            Some(b'b') => Ok('\x08'),
            Some(b'f') => Ok('\x0C'),
            Some(b'n') => Ok('\n'),
            Some(b'r') => Ok('\r'),
            Some(b't') => Ok('\t'),
            Some(b'u') => self.read_unicode_escape(at),
            Some(b) => Err(self.error(
                format!("invalid escape sequence '\\{}'", b as char),
                at,
            )),
        }
    }

    /// Read a `\uXXXX` escape, pairing surrogates.
    fn read_unicode_escape(&mut self, at: Position) -> Result<char, SyntaxError> {
        let unit = self.read_hex4(at)?;

        if (0xD800..=0xDBFF).contains(&unit) {
            // High surrogate, must be followed by an escaped low surrogate.
            if self.advance() != Some(b'\\') || self.advance() != Some(b'u') {
                return Err(self.error("unpaired surrogate in unicode escape", at));
            }
            let low = self.read_hex4(at)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.error("unpaired surrogate in unicode escape", at));
            }
            let combined =
                0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
            return char::from_u32(combined)
                .ok_or_else(|| self.error("invalid unicode escape", at));
        }

        if (0xDC00..=0xDFFF).contains(&unit) {
            return Err(self.error("unpaired surrogate in unicode escape", at));
        }

        char::from_u32(u32::from(unit)).ok_or_else(|| self.error("invalid unicode escape", at))
    }

    /// Read four hex digits.
    fn read_hex4(&mut self, at: Position) -> Result<u16, SyntaxError> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let digit = match self.advance() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                _ => return Err(self.error("invalid unicode escape", at)),
            };
            value = (value << 4) | u16::from(digit);
        }
        Ok(value)
    }

    /// Read a number token: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
    fn read_number(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.position();

        if self.peek() == Some(b'-') {
            self.advance();
        }

        match self.peek() {
            Some(b'0') => {
                self.advance();
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(self.error("leading zero in number", start));
                }
            }
            Some(b'1'..=b'9') => {
                while let Some(b'0'..=b'9') = self.peek() {
                    self.advance();
                }
            }
            _ => return Err(self.error("expected digit in number", self.position())),
        }

        if self.peek() == Some(b'.') {
            self.advance();
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("expected digit after decimal point", self.position()));
            }
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        if let Some(b'e' | b'E') = self.peek() {
            self.advance();
            if let Some(b'+' | b'-') = self.peek() {
                self.advance();
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("expected digit in exponent", self.position()));
            }
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        let raw = String::from_utf8_lossy(&self.input[start.offset..self.pos]).into_owned();
        let value = raw
            .parse::<f64>()
            .map_err(|_| self.error("invalid number", start))?;
        Ok(TokenKind::Number { raw, value })
    }

    /// Expect a literal keyword at the current position.
    fn expect_keyword(&mut self, word: &[u8]) -> Result<(), SyntaxError> {
        let start = self.position();
        for &expected in word {
            if self.advance() != Some(expected) {
                return Err(self.error(
                    format!("invalid literal, expected '{}'", String::from_utf8_lossy(word)),
                    start,
                ));
            }
        }
        Ok(())
    }
}
