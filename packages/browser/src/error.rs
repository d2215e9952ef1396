//! Error types for retrieval, dereferencing and navigation.
//!
//! Retrieval-layer failures (unsupported scheme, unknown or unsupported
//! media type, transport faults) are wrapped in [`Error::Retrieval`] so
//! callers of `get` can branch on the cause without knowing which layer
//! failed. Structural errors (JSON syntax, pointer resolution) indicate a
//! malformed input document rather than a failed retrieval and propagate
//! unwrapped. Navigation misuse surfaces as plain configuration errors.

use http::StatusCode;
use url::Url;

/// A `Result` alias where the `Err` case is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A retrieval-layer failure while resolving `uri`; the original
    /// failure travels as the source.
    #[error("failed to retrieve '{uri}'")]
    Retrieval {
        uri: String,
        #[source]
        cause: Box<Error>,
    },

    #[error("no URI scheme plugin registered for '{scheme}'")]
    UnsupportedUriScheme { scheme: String },

    #[error("response for '{uri}' did not declare a media type")]
    UnknownMediaType { uri: String },

    #[error("no media type plugin registered for '{media_type}'")]
    UnsupportedMediaType { media_type: String },

    #[error("HTTP status {status} retrieving '{url}'")]
    Http { status: StatusCode, url: String },

    #[error("exceeded {limit} redirects retrieving '{url}'")]
    TooManyRedirects { url: String, limit: usize },

    #[error("cannot reference file resource '{uri}' from non-file document '{referrer}'")]
    CrossSchemeReference { uri: String, referrer: String },

    #[error("invalid URI reference '{uri}'")]
    InvalidUri { uri: String },

    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Syntax(#[from] jref::SyntaxError),

    #[error(transparent)]
    Jref(#[from] jref::JrefError),

    #[error(transparent)]
    Pointer(#[from] jref::PointerError),

    #[error("cannot take the value of a {kind} node")]
    NotAScalar { kind: &'static str },

    #[error("expected an array node, found {kind}")]
    NotAnArray { kind: &'static str },

    #[error("expected an object node, found {kind}")]
    NotAnObject { kind: &'static str },
}

impl Error {
    /// Wrap a retrieval-layer failure with the URI being resolved.
    /// Structural errors pass through untouched; they describe the
    /// document, not the retrieval.
    pub(crate) fn wrap_retrieval(uri: &Url, cause: Error) -> Error {
        match cause {
            structural @ (Error::Syntax(_) | Error::Jref(_) | Error::Pointer(_)) => structural,
            cause => Error::Retrieval { uri: uri.to_string(), cause: Box::new(cause) },
        }
    }

    /// The wrapped failure, for [`Error::Retrieval`].
    #[must_use]
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Error::Retrieval { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
