//! Media type plugins and content negotiation.
//!
//! A media type plugin turns a retrieved response's bytes into a parsed
//! [`Document`], selected by matching the response's `Content-Type`
//! against each registered plugin in registration order. The registry also
//! builds the outgoing `Accept` header and resolves file extensions for
//! transports that have no `Content-Type` to offer.

mod jref_media;
mod json;

pub use jref_media::JrefMediaType;
pub use json::JsonMediaType;

use std::sync::Arc;

use crate::document::Document;
use crate::error::Result;
use crate::response::Response;

/// Strategy for parsing one media type into a [`Document`].
pub trait MediaTypePlugin: Send + Sync {
    /// The media type this plugin handles, e.g. `application/json`.
    fn media_type(&self) -> &str;

    /// File extensions (without the dot) this plugin claims, for
    /// transports that determine media types from file names.
    fn extensions(&self) -> &[&str];

    /// Quality weight for content negotiation. `None` omits the
    /// `q` parameter, which HTTP reads as 1.
    fn quality(&self) -> Option<f32> {
        None
    }

    /// Parse a response body into a document.
    fn parse(&self, response: &Response) -> Result<Document>;
}

/// Ordered media type plugin registry. Matching walks plugins in
/// registration order; the first match wins.
#[derive(Clone, Default)]
pub struct MediaTypeRegistry {
    plugins: Vec<Arc<dyn MediaTypePlugin>>,
}

impl MediaTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { plugins: Vec::new() }
    }

    pub fn add(&mut self, plugin: Arc<dyn MediaTypePlugin>) {
        self.plugins.push(plugin);
    }

    pub fn remove(&mut self, media_type: &str) {
        self.plugins.retain(|plugin| plugin.media_type() != media_type);
    }

    /// The `Accept` header for outgoing requests: every registered type
    /// with its configured quality, then a universal low-priority
    /// fallback so unregistered content is negotiable but never
    /// preferred.
    #[must_use]
    pub fn accept_header(&self) -> String {
        let mut parts: Vec<String> = self
            .plugins
            .iter()
            .map(|plugin| match plugin.quality() {
                Some(quality) => format!("{}; q={quality}", plugin.media_type()),
                None => plugin.media_type().to_string(),
            })
            .collect();
        parts.push("*/*; q=0.001".to_string());
        parts.join(", ")
    }

    /// The first registered plugin whose media type matches
    /// `content_type`.
    #[must_use]
    pub fn matching(&self, content_type: &str) -> Option<&Arc<dyn MediaTypePlugin>> {
        self.plugins
            .iter()
            .find(|plugin| mime_match(plugin.media_type(), content_type))
    }

    /// The media type registered for a file extension, if any.
    #[must_use]
    pub fn from_extension(&self, extension: &str) -> Option<&str> {
        let extension = extension.trim_start_matches('.');
        self.plugins
            .iter()
            .find(|plugin| plugin.extensions().contains(&extension))
            .map(|plugin| plugin.media_type())
    }
}

/// Match a media type pattern against an actual media type. Parameters are
/// stripped and comparison is case-insensitive. Supports exact matches,
/// `*` wildcards for type or subtype, and structured syntax suffixes: a
/// pattern's subtype matches the part of the actual subtype after `+`, so
/// `application/json` matches `application/vnd.foo+json`. The type part
/// must always match.
#[must_use]
pub fn mime_match(pattern: &str, actual: &str) -> bool {
    let Some((pattern_type, pattern_subtype)) = split_mime(pattern) else {
        return false;
    };
    let Some((actual_type, actual_subtype)) = split_mime(actual) else {
        return false;
    };

    if pattern_type != "*" && pattern_type != actual_type {
        return false;
    }
    if pattern_subtype == "*" || pattern_subtype == actual_subtype {
        return true;
    }
    match actual_subtype.rsplit_once('+') {
        Some((_, suffix)) => pattern_subtype == suffix,
        None => false,
    }
}

/// Split a media type into lowercased (type, subtype), dropping
/// parameters. `None` when either part is missing.
fn split_mime(media_type: &str) -> Option<(String, String)> {
    let essence = media_type.split(';').next()?.trim().to_ascii_lowercase();
    let (main, subtype) = essence.split_once('/')?;
    if main.is_empty() || subtype.is_empty() {
        return None;
    }
    Some((main.to_string(), subtype.to_string()))
}
