//! The parsed result of one retrieved resource.

use hashbrown::HashMap;
use jref::Node;
use url::Url;

/// How a fragment addresses a location inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Fragments are JSON Pointers walked from the document root.
    Pointer,
    /// Fragments carry no pointer semantics; any fragment addresses the
    /// whole root.
    Other,
}

/// One retrieved, parsed resource: its fragmentless URI, JRef root, how
/// fragments address into it, declared named anchors, and any bundled
/// sub-documents addressable by their own absolute URI without a separate
/// retrieval.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    pub root: Node,
    pub fragment_kind: FragmentKind,
    pub anchors: HashMap<String, String>,
    pub embedded: HashMap<Url, Document>,
}

impl Document {
    /// A pointer-addressed document with no anchors and nothing embedded.
    #[must_use]
    pub fn new(uri: Url, root: Node) -> Self {
        Self {
            uri,
            root,
            fragment_kind: FragmentKind::Pointer,
            anchors: HashMap::new(),
            embedded: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_fragment_kind(mut self, fragment_kind: FragmentKind) -> Self {
        self.fragment_kind = fragment_kind;
        self
    }

    /// Declare a named anchor: a fragment equal to `name` resolves at
    /// `pointer` instead.
    #[must_use]
    pub fn with_anchor(mut self, name: impl Into<String>, pointer: impl Into<String>) -> Self {
        self.anchors.insert(name.into(), pointer.into());
        self
    }

    /// Bundle a sub-document, keyed by its own URI.
    #[must_use]
    pub fn with_embedded(mut self, document: Document) -> Self {
        self.embedded.insert(document.uri.clone(), document);
        self
    }

    /// Find an embedded document by URI, searching transitively through
    /// nested embedded documents.
    pub(crate) fn find_embedded(&self, uri: &Url) -> Option<&Document> {
        if let Some(document) = self.embedded.get(uri) {
            return Some(document);
        }
        self.embedded
            .values()
            .find_map(|document| document.find_embedded(uri))
    }
}
