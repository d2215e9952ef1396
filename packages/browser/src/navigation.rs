//! Navigation primitives over resolved nodes.
//!
//! Indexing primitives ([`Browser::step`], [`Browser::iter`],
//! [`Browser::values`], [`Browser::entries`]) repeat the
//! reference-following step after indexing, so they always hand back
//! fully dereferenced nodes. Each call builds a fresh cursor; a cursor's
//! `next` suspends until any reference-follow it triggers completes and
//! yields results in source order. Purely local accessors ([`value`],
//! [`type_of`], [`has`], [`length`], [`keys`]) never retrieve anything.

use jref::{Node, Value};

use crate::browser::Browser;
use crate::error::{Error, Result};

impl Browser {
    /// Index one step into an array or object and dereference the result.
    /// Object keys resolve like pointer segments: the last matching
    /// member wins.
    pub async fn step(&self, key: &str, node: &Node) -> Result<Node> {
        let target = jref::pointer::step(key, node)?.clone();
        self.follow(target).await
    }

    /// Follow a node if it is a reference; anything else passes through.
    pub(crate) async fn follow(&self, node: Node) -> Result<Node> {
        match &node.value {
            Value::Reference(reference) => {
                self.get_from(reference.href.as_str(), Some(&reference.document_uri))
                    .await
            }
            _ => Ok(node),
        }
    }

    /// A cursor over an array's items, dereferencing each.
    pub fn iter(&self, node: &Node) -> Result<Iter<'_>> {
        let items = node
            .as_array()
            .ok_or_else(|| Error::NotAnArray { kind: node.kind() })?;
        Ok(Iter { browser: self, items: items.to_vec().into_iter() })
    }

    /// A cursor over an object's member values, dereferencing each.
    pub fn values(&self, node: &Node) -> Result<Values<'_>> {
        Ok(Values { entries: self.entries(node)? })
    }

    /// A cursor over an object's `(name, value)` pairs, dereferencing
    /// each value.
    pub fn entries(&self, node: &Node) -> Result<Entries<'_>> {
        let members = node
            .as_object()
            .ok_or_else(|| Error::NotAnObject { kind: node.kind() })?;
        let members: Vec<(String, Node)> = members
            .iter()
            .map(|member| (member.key.name.clone(), member.value.clone()))
            .collect();
        Ok(Entries { browser: self, members: members.into_iter() })
    }
}

/// Array cursor. Not safe for concurrent advancement by two consumers;
/// build one per consumer with [`Browser::iter`].
pub struct Iter<'a> {
    browser: &'a Browser,
    items: std::vec::IntoIter<Node>,
}

impl Iter<'_> {
    pub async fn next(&mut self) -> Option<Result<Node>> {
        let node = self.items.next()?;
        Some(self.browser.follow(node).await)
    }
}

/// Object member cursor yielding `(name, value)` pairs.
pub struct Entries<'a> {
    browser: &'a Browser,
    members: std::vec::IntoIter<(String, Node)>,
}

impl Entries<'_> {
    pub async fn next(&mut self) -> Option<Result<(String, Node)>> {
        let (name, node) = self.members.next()?;
        Some(self.browser.follow(node).await.map(|node| (name, node)))
    }
}

/// Object member cursor yielding values only.
pub struct Values<'a> {
    entries: Entries<'a>,
}

impl Values<'_> {
    pub async fn next(&mut self) -> Option<Result<Node>> {
        Some(self.entries.next().await?.map(|(_, node)| node))
    }
}

/// The value of a scalar node. Composite and reference nodes are a
/// configuration error; dereference first.
pub fn value(node: &Node) -> Result<Value> {
    match &node.value {
        Value::Array(_) | Value::Object(_) | Value::Reference(_) => {
            Err(Error::NotAScalar { kind: node.kind() })
        }
        scalar => Ok(scalar.clone()),
    }
}

/// The node's kind as a lowercase name.
#[must_use]
pub fn type_of(node: &Node) -> &'static str {
    node.kind()
}

/// Whether an object node has a member named `key`.
#[must_use]
pub fn has(key: &str, node: &Node) -> bool {
    node.get(key).is_some()
}

/// The length of an array node.
pub fn length(node: &Node) -> Result<usize> {
    node.as_array()
        .map(<[Node]>::len)
        .ok_or_else(|| Error::NotAnArray { kind: node.kind() })
}

/// The member names of an object node, in source order. Duplicate names
/// appear once per member.
pub fn keys(node: &Node) -> Result<impl Iterator<Item = &str>> {
    node.as_object()
        .map(|members| members.iter().map(|member| member.key.name.as_str()))
        .ok_or_else(|| Error::NotAnObject { kind: node.kind() })
}
