//! Recursive descent JSON parser producing positioned AST nodes.
//!
//! Arrays and objects are comma-separated sequences terminated by `]`/`}`;
//! leading commas, trailing commas and missing separators are positioned
//! syntax errors, as is any content after the first value.

use crate::error::SyntaxError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::{Key, Member, Node, Number, Value};
use crate::position::Span;

/// Post-order node transform. Receives each node once its children are
/// fully built, together with its property name or array index as a string
/// (`None` for the document root). Returning `None` removes the node from
/// its parent: object members are dropped, array slots become null.
pub type Reviver<'r> = &'r mut dyn FnMut(Node, Option<&str>) -> Option<Node>;

/// Parse JSON text into a positioned AST.
pub fn parse(text: &str) -> Result<Node, SyntaxError> {
    let mut parser = Parser::new(text)?;
    let mut reviver: Option<Reviver> = None;
    let node = parser.parse_value(&mut reviver)?;
    parser.expect_eof()?;
    Ok(node)
}

/// Parse JSON text, passing every node through `reviver` bottom-up.
/// `None` when the reviver drops the root.
pub fn parse_with<R>(text: &str, mut reviver: R) -> Result<Option<Node>, SyntaxError>
where
    R: FnMut(Node, Option<&str>) -> Option<Node>,
{
    let mut parser = Parser::new(text)?;
    let mut reviver: Option<Reviver> = Some(&mut reviver);
    let node = parser.parse_value(&mut reviver)?;
    parser.expect_eof()?;
    Ok(apply(&mut reviver, node, None))
}

fn apply(reviver: &mut Option<Reviver>, node: Node, key: Option<&str>) -> Option<Node> {
    match reviver {
        Some(reviver) => reviver(node, key),
        None => Some(node),
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Result<Self, SyntaxError> {
        let mut lexer = Lexer::new(text);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.current.span.start)
    }

    fn expect_eof(&self) -> Result<(), SyntaxError> {
        if self.current.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.error("unexpected content after JSON value"))
        }
    }

    /// Parse a single value. The reviver is applied by the caller, at the
    /// site that knows the node's key.
    fn parse_value(&mut self, reviver: &mut Option<Reviver>) -> Result<Node, SyntaxError> {
        let span = self.current.span;
        let value = match &self.current.kind {
            TokenKind::Null => {
                self.advance()?;
                Value::Null
            }
            TokenKind::Boolean(b) => {
                let b = *b;
                self.advance()?;
                Value::Boolean(b)
            }
            TokenKind::Number { raw, value } => {
                let number = Number::from_parts(raw.clone(), *value);
                self.advance()?;
                Value::Number(number)
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance()?;
                Value::String(s)
            }
            TokenKind::BeginObject => return self.parse_object(reviver),
            TokenKind::BeginArray => return self.parse_array(reviver),
            TokenKind::Eof => {
                return Err(self.error("unexpected end of input, expected a value"));
            }
            _ => return Err(self.error("unexpected token, expected a value")),
        };
        Ok(Node::new(value, span))
    }

    fn parse_object(&mut self, reviver: &mut Option<Reviver>) -> Result<Node, SyntaxError> {
        let start = self.current.span.start;
        self.advance()?;

        let mut members = Vec::new();

        if self.current.kind == TokenKind::EndObject {
            let end = self.current.span.end;
            self.advance()?;
            return Ok(Node::new(Value::Object(members), Span { start, end }));
        }

        loop {
            let key = match &self.current.kind {
                TokenKind::String(name) => Key { name: name.clone(), span: self.current.span },
                _ => return Err(self.error("expected a string property name")),
            };
            self.advance()?;

            if self.current.kind != TokenKind::Colon {
                return Err(self.error("expected ':' after property name"));
            }
            self.advance()?;

            let value = self.parse_value(reviver)?;
            if let Some(value) = apply(reviver, value, Some(key.name.as_str())) {
                members.push(Member { key, value });
            }

            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                    if self.current.kind == TokenKind::EndObject {
                        return Err(self.error("trailing comma before '}'"));
                    }
                }
                TokenKind::EndObject => {
                    let end = self.current.span.end;
                    self.advance()?;
                    return Ok(Node::new(Value::Object(members), Span { start, end }));
                }
                _ => return Err(self.error("expected ',' or '}' after property value")),
            }
        }
    }

    fn parse_array(&mut self, reviver: &mut Option<Reviver>) -> Result<Node, SyntaxError> {
        let start = self.current.span.start;
        self.advance()?;

        let mut items = Vec::new();

        if self.current.kind == TokenKind::EndArray {
            let end = self.current.span.end;
            self.advance()?;
            return Ok(Node::new(Value::Array(items), Span { start, end }));
        }

        loop {
            let value = self.parse_value(reviver)?;
            let span = value.span;
            let index = items.len().to_string();
            match apply(reviver, value, Some(index.as_str())) {
                Some(value) => items.push(value),
                // The slot survives so later indices keep their positions.
                None => items.push(Node::new(Value::Null, span)),
            }

            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                    if self.current.kind == TokenKind::EndArray {
                        return Err(self.error("trailing comma before ']'"));
                    }
                }
                TokenKind::EndArray => {
                    let end = self.current.span.end;
                    self.advance()?;
                    return Ok(Node::new(Value::Array(items), Span { start, end }));
                }
                _ => return Err(self.error("expected ',' or ']' after array item")),
            }
        }
    }
}
