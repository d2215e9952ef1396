//! The materialized result of one retrieval.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, header};
use url::Url;

use crate::error::{Error, Result};

/// Status, headers, effective URL and collected body of one retrieval, as
/// handed from a URI scheme plugin to a media type plugin. `url` is the
/// URL the resource was effectively read from; redirects and symlink
/// resolution may make it differ from the requested URI, and its fragment
/// (if any) replaces the request fragment during dereferencing.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
    pub body: Bytes,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: Bytes) -> Self {
        Self { status, headers, url, body }
    }

    /// The `Content-Type` header, if present and readable.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE)?.to_str().ok()
    }

    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body).map_err(|_| Error::Transport {
            message: format!("response body for '{}' is not valid UTF-8", self.url),
        })
    }
}
