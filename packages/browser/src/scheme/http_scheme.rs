//! HTTP(S) scheme plugin: the policy layer around a fetch-like transport.
//!
//! Sends the negotiated `Accept` header, classifies status codes, and
//! follows redirects manually so fragment semantics stay under this
//! crate's control: a redirect target without its own fragment inherits
//! the request fragment; a `Location` with a fragment overrides it. The
//! wire mechanics live behind [`Fetch`] so tests and TLS-capable clients
//! can substitute their own transport.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Method, Request, StatusCode, header};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::error::{Error, Result};
use crate::response::Response;
use crate::scheme::{RetrieveOptions, UriSchemePlugin};

/// The fetch-like transport primitive: one request in, one materialized
/// response out. No redirect following, no policy.
pub trait Fetch: Send + Sync {
    fn fetch<'a>(&'a self, request: Request<Bytes>) -> BoxFuture<'a, Result<Response>>;
}

/// Policy knobs for the HTTP scheme plugin.
#[derive(Debug, Clone)]
pub struct HttpSchemeConfig {
    /// Redirects followed per retrieval before giving up.
    pub max_redirects: usize,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for HttpSchemeConfig {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            user_agent: concat!("hyperjump/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Statuses that re-issue retrieval against the `Location` target.
const REDIRECT_STATUSES: [StatusCode; 5] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

/// HTTP(S) retrieval policy over a pluggable transport.
pub struct HttpScheme {
    transport: Arc<dyn Fetch>,
    config: HttpSchemeConfig,
}

impl HttpScheme {
    #[must_use]
    pub fn new(transport: Arc<dyn Fetch>) -> Self {
        Self::with_config(transport, HttpSchemeConfig::default())
    }

    #[must_use]
    pub fn with_config(transport: Arc<dyn Fetch>, config: HttpSchemeConfig) -> Self {
        Self { transport, config }
    }
}

impl UriSchemePlugin for HttpScheme {
    fn schemes(&self) -> &[&str] {
        &["http", "https"]
    }

    fn retrieve<'a>(
        &'a self,
        uri: &'a Url,
        options: RetrieveOptions<'a>,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let accept = options.media_types.accept_header();
            let mut fragment: Option<String> = uri.fragment().map(str::to_string);
            let mut url = uri.clone();
            url.set_fragment(None);
            let mut redirects = 0;

            loop {
                let request = Request::builder()
                    .method(Method::GET)
                    .uri(url.as_str())
                    .header(header::ACCEPT, accept.as_str())
                    .header(header::USER_AGENT, self.config.user_agent.as_str())
                    .body(Bytes::new())
                    .map_err(|error| Error::Transport { message: error.to_string() })?;

                let mut response = self.transport.fetch(request).await?;
                let status = response.status;

                if REDIRECT_STATUSES.contains(&status) {
                    let location = response
                        .headers
                        .get(header::LOCATION)
                        .and_then(|value| value.to_str().ok())
                        .ok_or(Error::Http { status, url: url.to_string() })?;
                    let next = url
                        .join(location)
                        .map_err(|_| Error::InvalidUri { uri: location.to_string() })?;

                    // A Location carrying its own fragment overrides the
                    // one in flight; otherwise the request fragment is
                    // inherited across the redirect.
                    if next.fragment().is_some() {
                        fragment = next.fragment().map(str::to_string);
                    }

                    redirects += 1;
                    if redirects > self.config.max_redirects {
                        return Err(Error::TooManyRedirects {
                            url: next.to_string(),
                            limit: self.config.max_redirects,
                        });
                    }
                    tracing::debug!(from = %url, to = %next, %status, "following redirect");
                    url = next;
                    url.set_fragment(None);
                    continue;
                }

                if status == StatusCode::OK || status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
                    let mut effective = url.clone();
                    effective.set_fragment(fragment.as_deref());
                    response.url = effective;
                    return Ok(response);
                }

                return Err(Error::Http { status, url: url.to_string() });
            }
        })
    }
}

/// Default transport: a plain-HTTP hyper client. `https` needs a
/// TLS-capable [`Fetch`] supplied by the caller.
pub struct HyperFetch {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperFetch {
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::builder(TokioExecutor::new()).build_http() }
    }
}

impl Default for HyperFetch {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HyperFetch {
    fn fetch<'a>(&'a self, request: Request<Bytes>) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let uri = request.uri().to_string();
            let url = Url::parse(&uri).map_err(|_| Error::InvalidUri { uri: uri.clone() })?;
            if url.scheme() != "http" {
                return Err(Error::Transport {
                    message: format!(
                        "the built-in transport only speaks plain http; \
                         supply a TLS-capable Fetch for '{}'",
                        url.scheme()
                    ),
                });
            }

            let (parts, body) = request.into_parts();
            let request = Request::from_parts(parts, Full::new(body));
            let response: http::Response<hyper::body::Incoming> = self
                .client
                .request(request)
                .await
                .map_err(|error| Error::Transport { message: error.to_string() })?;

            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|error| Error::Transport { message: error.to_string() })?
                .to_bytes();

            Ok(Response::new(parts.status, parts.headers, url, body))
        })
    }
}
