//! Error types for parsing, pointer resolution and the JRef codec.

use crate::position::Position;

/// Malformed JSON text, positioned at the offending input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {position}")]
pub struct SyntaxError {
    pub message: String,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self { message: message.into(), position }
    }
}

/// A JSON Pointer that does not address an existing node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    #[error("json pointer '{pointer}' must be empty or begin with '/'")]
    Malformed { pointer: String },

    #[error("cannot index into a {kind} value with '{segment}'")]
    ScalarTarget { kind: &'static str, segment: String },

    #[error("object has no property named '{key}'")]
    MissingKey { key: String },

    #[error("invalid array index '{segment}'")]
    InvalidIndex { segment: String },

    #[error("array index {index} is out of range for length {length}")]
    OutOfRange { index: usize, length: usize },

    #[error("the append marker '-' does not address an existing array item")]
    AppendMarker,
}

/// Failure while reading or writing the JRef dialect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JrefError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("cannot resolve reference target '{href}' against '{base}'")]
    InvalidHref {
        href: String,
        base: String,
        #[source]
        source: url::ParseError,
    },
}
