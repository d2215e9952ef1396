//! The resolver: document cache, plugin registries and the
//! reference-following algorithm.

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use url::Url;

use crate::document::{Document, FragmentKind};
use crate::error::{Error, Result};
use crate::media::{JrefMediaType, JsonMediaType, MediaTypePlugin, MediaTypeRegistry};
use crate::scheme::{
    FileScheme, HttpScheme, HyperFetch, RetrieveOptions, SchemeRegistry, UriSchemePlugin,
};

/// A lazy multi-document JSON Reference browser.
///
/// Owns its URI scheme and media type registries and an append-only
/// document cache, all instance-scoped; nothing is shared between
/// instances. Retrieval is not deduplicated: two concurrent `get` calls
/// for the same uncached URI each retrieve, and the last to finish wins
/// the cache slot.
///
/// Reference chains are followed with no depth limit and no cycle
/// detection; resolving a cyclic chain does not terminate.
pub struct Browser {
    schemes: SchemeRegistry,
    media_types: MediaTypeRegistry,
    cache: Mutex<HashMap<String, Document>>,
    context_uri: Option<Url>,
}

impl Browser {
    /// A browser with no plugins registered. See [`Browser::default`] for
    /// one wired with the built-in schemes and media types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schemes: SchemeRegistry::new(),
            media_types: MediaTypeRegistry::new(),
            cache: Mutex::new(HashMap::new()),
            context_uri: None,
        }
    }

    /// Register a URI scheme plugin, affecting subsequent `get` calls.
    pub fn add_uri_scheme(&mut self, plugin: Arc<dyn UriSchemePlugin>) {
        self.schemes.add(plugin);
    }

    pub fn remove_uri_scheme(&mut self, scheme: &str) {
        self.schemes.remove(scheme);
    }

    /// Register a media type plugin. Registration order is negotiation
    /// order.
    pub fn add_media_type(&mut self, plugin: Arc<dyn MediaTypePlugin>) {
        self.media_types.add(plugin);
    }

    pub fn remove_media_type(&mut self, media_type: &str) {
        self.media_types.remove(media_type);
    }

    /// Base URI that relative root-level `get` calls resolve against.
    pub fn set_context_uri(&mut self, uri: Url) {
        self.context_uri = Some(uri);
    }

    /// Retrieve, parse and dereference the value at `uri`, following
    /// reference chains across documents until a concrete node is
    /// reached.
    pub async fn get(&self, uri: &str) -> Result<jref::Node> {
        self.get_from(uri, None).await
    }

    /// `get` in the context of a referring document, used when following
    /// a reference: relative URIs resolve against `referenced_from`, and
    /// documents embedded in the referring document are reachable.
    pub(crate) async fn get_from(
        &self,
        uri: &str,
        referenced_from: Option<&Url>,
    ) -> Result<jref::Node> {
        let mut target = self.absolute(uri, referenced_from)?;
        let mut referrer: Option<Url> = referenced_from.cloned();

        loop {
            let mut id = target.clone();
            id.set_fragment(None);
            let mut fragment = decode_fragment(&target)?;

            let document = match self.lookup(&id, referrer.as_ref()) {
                Some(document) => document,
                None => {
                    let (document, effective_fragment) =
                        self.retrieve(&id, &target, referrer.as_ref()).await?;
                    if let Some(effective) = effective_fragment {
                        fragment = effective;
                    }
                    document
                }
            };

            let node = resolve_fragment(&document, &fragment)?;
            match &node.value {
                jref::Value::Reference(reference) => {
                    tracing::debug!(href = %reference.href, "following reference");
                    target = reference.href.clone();
                    referrer = Some(reference.document_uri.clone());
                }
                _ => return Ok(node),
            }
        }
    }

    /// Find an already-available document: the instance cache first, then
    /// the embedded documents of the referring document. A document
    /// independently retrieved always shadows a same-URI document bundled
    /// inside another resource.
    fn lookup(&self, id: &Url, referrer: Option<&Url>) -> Option<Document> {
        let cache = self.cache();
        if let Some(document) = cache.get(id.as_str()) {
            tracing::debug!(uri = %id, "cache hit");
            return Some(document.clone());
        }

        let referrer = referrer?;
        let mut referrer_id = referrer.clone();
        referrer_id.set_fragment(None);

        // The referring document itself may be cached or embedded.
        let parent = match cache.get(referrer_id.as_str()) {
            Some(parent) => Some(parent.clone()),
            None => cache
                .values()
                .find_map(|document| document.find_embedded(&referrer_id))
                .cloned(),
        }?;
        let embedded = parent.find_embedded(id).cloned();
        if embedded.is_some() {
            tracing::debug!(uri = %id, parent = %parent.uri, "resolved embedded document");
        }
        embedded
    }

    /// Retrieve, parse and cache the document at `id`. Returns the
    /// document and, when the transport rewrote the fragment (an HTTP
    /// redirect whose target carries one), the effective fragment.
    async fn retrieve(
        &self,
        id: &Url,
        target: &Url,
        referrer: Option<&Url>,
    ) -> Result<(Document, Option<String>)> {
        tracing::debug!(uri = %id, "retrieving document");
        self.retrieve_inner(target, referrer)
            .await
            .map(|(document, fragment)| {
                self.cache().insert(id.as_str().to_string(), document.clone());
                (document, fragment)
            })
            .map_err(|error| Error::wrap_retrieval(id, error))
    }

    async fn retrieve_inner(
        &self,
        target: &Url,
        referrer: Option<&Url>,
    ) -> Result<(Document, Option<String>)> {
        let plugin = self.schemes.get(target.scheme())?;
        let options = RetrieveOptions {
            referenced_from: referrer,
            media_types: &self.media_types,
        };
        let response = plugin.retrieve(target, options).await?;

        let media_type = response
            .content_type()
            .ok_or_else(|| Error::UnknownMediaType { uri: target.to_string() })?;
        let parser = self
            .media_types
            .matching(media_type)
            .ok_or_else(|| Error::UnsupportedMediaType { media_type: media_type.to_string() })?;
        let document = parser.parse(&response)?;

        let effective_fragment = match response.url.fragment() {
            Some(_) => Some(decode_fragment(&response.url)?),
            None => None,
        };
        Ok((document, effective_fragment))
    }

    /// Resolve a URI reference against the referring document, or the
    /// ambient context for root-level calls.
    fn absolute(&self, uri: &str, referenced_from: Option<&Url>) -> Result<Url> {
        match referenced_from.or(self.context_uri.as_ref()) {
            Some(base) => base.join(uri),
            None => Url::parse(uri),
        }
        .map_err(|_| Error::InvalidUri { uri: uri.to_string() })
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Document>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The built-in wiring: JRef and JSON media types, HTTP(S) over the
/// hyper transport, and the file scheme.
impl Default for Browser {
    fn default() -> Self {
        let mut browser = Browser::new();
        browser.add_media_type(Arc::new(JrefMediaType));
        browser.add_media_type(Arc::new(JsonMediaType));
        browser.add_uri_scheme(Arc::new(HttpScheme::new(Arc::new(HyperFetch::new()))));
        browser.add_uri_scheme(Arc::new(FileScheme));
        browser
    }
}

/// Locate the node a fragment addresses. A fragment matching a declared
/// anchor is substituted with that anchor's pointer; pointer-kind
/// documents are then pointer-walked, anything else addresses the root.
fn resolve_fragment(document: &Document, fragment: &str) -> Result<jref::Node> {
    let pointer = document
        .anchors
        .get(fragment)
        .map_or(fragment, String::as_str);
    match document.fragment_kind {
        FragmentKind::Pointer => Ok(jref::pointer::get(pointer, &document.root)?.clone()),
        FragmentKind::Other => Ok(document.root.clone()),
    }
}

/// The percent-decoded fragment of a URL; empty when absent.
fn decode_fragment(url: &Url) -> Result<String> {
    match url.fragment() {
        None => Ok(String::new()),
        Some(raw) => urlencoding::decode(raw)
            .map(Cow::into_owned)
            .map_err(|_| Error::InvalidUri { uri: url.to_string() }),
    }
}
