//! The JRef layer: `$ref` recognition on the way in, re-relativization on
//! the way out.
//!
//! Reading composes the parser with a reviver that replaces any object
//! whose `"$ref"` member holds a string with a reference node; the target
//! is resolved absolute against the document URI at parse time, so
//! reference nodes are self-contained. Sibling members next to `"$ref"`
//! are legal on the wire but carry no meaning and are discarded. Writing
//! renders references as `{"$ref": "<target>"}` with the target
//! relativized against a base URI before delegating to the stringifier.

use url::Url;

use crate::error::JrefError;
use crate::node::{Node, Reference, Value};
use crate::parser;
use crate::stringify;

/// Parse JRef text, replacing `$ref` objects with reference nodes resolved
/// against `base`.
pub fn from_jref(text: &str, base: &Url) -> Result<Node, JrefError> {
    let mut href_error = None;
    let node = parser::parse_with(text, |node, _key| {
        Some(into_reference(node, base, &mut href_error))
    })?;
    if let Some(error) = href_error {
        return Err(error);
    }
    // The reviver above never drops a node.
    Ok(node.unwrap_or_else(Node::null))
}

/// Parse JRef text with a user reviver. The reviver runs after `$ref`
/// recognition, so it sees reference nodes as well as every non-reference
/// node. `None` when the reviver drops the root.
pub fn from_jref_with<R>(text: &str, base: &Url, mut reviver: R) -> Result<Option<Node>, JrefError>
where
    R: FnMut(Node, Option<&str>) -> Option<Node>,
{
    let mut href_error = None;
    let node = parser::parse_with(text, |node, key| {
        let node = into_reference(node, base, &mut href_error);
        reviver(node, key)
    })?;
    if let Some(error) = href_error {
        return Err(error);
    }
    Ok(node)
}

/// Serialize a JRef AST, rendering references relative to `base`.
#[must_use]
pub fn to_jref(node: &Node, base: &Url) -> String {
    stringify::stringify_with(node, |node, _key| Some(from_reference(node, base)), None)
        .unwrap_or_default()
}

/// Serialize with a user replacer and optional indentation. The replacer
/// runs first, so it sees reference nodes before they are rendered as
/// `$ref` objects. `None` when the replacer drops the root.
pub fn to_jref_with<R>(
    node: &Node,
    base: &Url,
    mut replacer: R,
    space: Option<&str>,
) -> Option<String>
where
    R: FnMut(Node, Option<&str>) -> Option<Node>,
{
    stringify::stringify_with(
        node,
        |node, key| replacer(node, key).map(|node| from_reference(node, base)),
        space,
    )
}

/// Replace a `$ref`-shaped object with a reference node. Anything else
/// passes through untouched. Unresolvable targets park an error in
/// `href_error` and leave the object alone; the caller surfaces the error
/// once parsing finishes.
fn into_reference(node: Node, base: &Url, href_error: &mut Option<JrefError>) -> Node {
    let href = match &node.value {
        Value::Object(_) => match node.get("$ref").map(|target| &target.value) {
            Some(Value::String(href)) => href.clone(),
            _ => return node,
        },
        _ => return node,
    };

    match base.join(&href) {
        Ok(href) => Node::new(
            Value::Reference(Reference { href, document_uri: base.clone() }),
            node.span,
        ),
        Err(source) => {
            if href_error.is_none() {
                *href_error = Some(JrefError::InvalidHref {
                    href,
                    base: base.to_string(),
                    source,
                });
            }
            node
        }
    }
}

/// Turn a reference node back into a `$ref` object with a relativized
/// target.
fn from_reference(node: Node, base: &Url) -> Node {
    match &node.value {
        Value::Reference(reference) => {
            let href = relativize(&reference.href, base);
            let mut object = Node::object(vec![crate::node::Member::new(
                "$ref",
                Node::string(href),
            )]);
            object.span = node.span;
            object
        }
        _ => node,
    }
}

/// Express `href` relative to `base`, falling back to the absolute form
/// when no relative reference exists (e.g. different scheme or authority).
fn relativize(href: &Url, base: &Url) -> String {
    base.make_relative(href).unwrap_or_else(|| href.to_string())
}
