//! URI scheme plugins: strategies for retrieving raw bytes and headers
//! for a given URI scheme.

mod file;
mod http_scheme;

pub use file::FileScheme;
pub use http_scheme::{Fetch, HttpScheme, HttpSchemeConfig, HyperFetch};

use std::sync::Arc;

use futures::future::BoxFuture;
use hashbrown::HashMap;
use url::Url;

use crate::error::{Error, Result};
use crate::media::MediaTypeRegistry;
use crate::response::Response;

/// Context handed to a retrieval: the URI of the referring document (when
/// the retrieval was triggered by following a reference) and a view of the
/// media type registry, for Accept negotiation and extension lookups.
pub struct RetrieveOptions<'a> {
    pub referenced_from: Option<&'a Url>,
    pub media_types: &'a MediaTypeRegistry,
}

/// Strategy for retrieving a resource over one or more URI schemes.
///
/// The `uri` handed to [`retrieve`](Self::retrieve) may carry a fragment;
/// it is not part of the resource to fetch, but transports whose
/// indirection can rewrite it (HTTP redirects) report the effective
/// fragment on [`Response::url`].
pub trait UriSchemePlugin: Send + Sync {
    /// The schemes this plugin should be registered under.
    fn schemes(&self) -> &[&str];

    /// Retrieve the resource at `uri`.
    fn retrieve<'a>(
        &'a self,
        uri: &'a Url,
        options: RetrieveOptions<'a>,
    ) -> BoxFuture<'a, Result<Response>>;
}

/// Scheme to plugin map, owned by one browser instance.
#[derive(Clone, Default)]
pub struct SchemeRegistry {
    plugins: HashMap<String, Arc<dyn UriSchemePlugin>>,
}

impl SchemeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { plugins: HashMap::new() }
    }

    /// Register a plugin under every scheme it declares.
    pub fn add(&mut self, plugin: Arc<dyn UriSchemePlugin>) {
        for scheme in plugin.schemes() {
            self.plugins.insert((*scheme).to_string(), Arc::clone(&plugin));
        }
    }

    pub fn remove(&mut self, scheme: &str) {
        self.plugins.remove(scheme);
    }

    pub fn get(&self, scheme: &str) -> Result<&Arc<dyn UriSchemePlugin>> {
        self.plugins
            .get(scheme)
            .ok_or_else(|| Error::UnsupportedUriScheme { scheme: scheme.to_string() })
    }
}
