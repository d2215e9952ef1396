//! JSON Pointer (RFC 6901) addressing over the AST.
//!
//! An empty pointer addresses the root; otherwise segments are separated by
//! `/` and unescaped (`~1` to `/`, `~0` to `~`) before use. Stepping into
//! an object resolves the last matching property; stepping into an array
//! parses a base-10 index. The literal segment `-` is the append marker and
//! never addresses an existing item.

use crate::error::PointerError;
use crate::node::{Node, Value};

/// Resolve a pointer against a node.
pub fn get<'a>(pointer: &str, node: &'a Node) -> Result<&'a Node, PointerError> {
    if pointer.is_empty() {
        return Ok(node);
    }
    if !pointer.starts_with('/') {
        return Err(PointerError::Malformed { pointer: pointer.to_string() });
    }

    let mut current = node;
    for segment in pointer[1..].split('/') {
        current = step(&unescape(segment), current)?;
    }
    Ok(current)
}

/// Step one (already unescaped) segment into a node.
pub fn step<'a>(segment: &str, node: &'a Node) -> Result<&'a Node, PointerError> {
    match &node.value {
        Value::Object(_) => node
            .get(segment)
            .ok_or_else(|| PointerError::MissingKey { key: segment.to_string() }),
        Value::Array(items) => {
            if segment == "-" {
                return Err(PointerError::AppendMarker);
            }
            let index = parse_index(segment)?;
            items
                .get(index)
                .ok_or(PointerError::OutOfRange { index, length: items.len() })
        }
        _ => Err(PointerError::ScalarTarget {
            kind: node.kind(),
            segment: segment.to_string(),
        }),
    }
}

/// Base-10 array index per RFC 6901: digits only, no leading zeros.
fn parse_index(segment: &str) -> Result<usize, PointerError> {
    let invalid = || PointerError::InvalidIndex { segment: segment.to_string() };
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return Err(invalid());
    }
    segment.parse().map_err(|_| invalid())
}

/// Unescape a pointer segment: `~1` to `/`, then `~0` to `~`.
#[must_use]
pub fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Escape a property name for use as a pointer segment.
#[must_use]
pub fn escape(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}
