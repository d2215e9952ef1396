//! JSON stringifier, the inverse of the parser.
//!
//! Compact output has no redundant whitespace (`{"k":v}` / `[v]`); with an
//! indent unit it pretty-prints one unit per nesting depth. A replacer may
//! transform or drop nodes before they are rendered: dropped object members
//! are omitted entirely, dropped array items render as `null` so the array
//! keeps its shape.

use crate::node::{Member, Node, Reference, Value};

/// Node transform applied before rendering, mirroring the reviver's
/// signature. Returning `None` omits the node.
pub type Replacer<'r> = &'r mut dyn FnMut(Node, Option<&str>) -> Option<Node>;

/// Serialize an AST to compact JSON text.
#[must_use]
pub fn stringify(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut None, None, 0, &mut out);
    out
}

/// Serialize an AST, passing every node through `replacer` before it is
/// rendered. `None` when the replacer drops the root.
pub fn stringify_with<R>(node: &Node, mut replacer: R, space: Option<&str>) -> Option<String>
where
    R: FnMut(Node, Option<&str>) -> Option<Node>,
{
    let mut replacer: Option<Replacer> = Some(&mut replacer);
    let root = apply(&mut replacer, node.clone(), None)?;
    let mut out = String::new();
    write_node(&root, &mut replacer, space, 0, &mut out);
    Some(out)
}

fn apply(replacer: &mut Option<Replacer>, node: Node, key: Option<&str>) -> Option<Node> {
    match replacer {
        Some(replacer) => replacer(node, key),
        None => Some(node),
    }
}

fn write_node(
    node: &Node,
    replacer: &mut Option<Replacer>,
    space: Option<&str>,
    depth: usize,
    out: &mut String,
) {
    match &node.value {
        Value::Null => out.push_str("null"),
        Value::Boolean(true) => out.push_str("true"),
        Value::Boolean(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(n.raw()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => write_array(items, replacer, space, depth, out),
        Value::Object(members) => write_object(members, replacer, space, depth, out),
        Value::Reference(reference) => write_reference(reference, space, depth, out),
    }
}

fn write_array(
    items: &[Node],
    replacer: &mut Option<Replacer>,
    space: Option<&str>,
    depth: usize,
    out: &mut String,
) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }

    out.push('[');
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        newline_indent(space, depth + 1, out);
        let index_key = index.to_string();
        match apply(replacer, item.clone(), Some(index_key.as_str())) {
            Some(replaced) => write_node(&replaced, replacer, space, depth + 1, out),
            None => out.push_str("null"),
        }
    }
    newline_indent(space, depth, out);
    out.push(']');
}

fn write_object(
    members: &[Member],
    replacer: &mut Option<Replacer>,
    space: Option<&str>,
    depth: usize,
    out: &mut String,
) {
    out.push('{');
    let mut emitted = 0;
    for member in members {
        if let Some(replaced) = apply(replacer, member.value.clone(), Some(&member.key.name)) {
            if emitted > 0 {
                out.push(',');
            }
            emitted += 1;
            newline_indent(space, depth + 1, out);
            write_string(&member.key.name, out);
            out.push(':');
            if space.is_some() {
                out.push(' ');
            }
            write_node(&replaced, replacer, space, depth + 1, out);
        }
    }
    if emitted > 0 {
        newline_indent(space, depth, out);
    }
    out.push('}');
}

/// A reference node that reached the stringifier unreplaced renders with
/// its absolute target; `to_jref` relativizes before delegating here.
fn write_reference(reference: &Reference, space: Option<&str>, depth: usize, out: &mut String) {
    out.push('{');
    newline_indent(space, depth + 1, out);
    out.push_str("\"$ref\":");
    if space.is_some() {
        out.push(' ');
    }
    write_string(reference.href.as_str(), out);
    newline_indent(space, depth, out);
    out.push('}');
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c < '\x20' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn newline_indent(space: Option<&str>, depth: usize, out: &mut String) {
    if let Some(unit) = space {
        out.push('\n');
        for _ in 0..depth {
            out.push_str(unit);
        }
    }
}
