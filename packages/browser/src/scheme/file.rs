//! File scheme plugin.
//!
//! Reads `file:` URIs off the local filesystem. A file resource may not be
//! reached by following a reference out of a non-file document; allowing
//! that would let remote content walk the local filesystem. Symbolic links
//! are resolved, and the link target becomes the effective retrieval URI.
//! The media type comes from the file extension via the registry, since
//! there is no `Content-Type` header to consult.

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use url::Url;

use crate::error::{Error, Result};
use crate::response::Response;
use crate::scheme::{RetrieveOptions, UriSchemePlugin};

pub struct FileScheme;

impl UriSchemePlugin for FileScheme {
    fn schemes(&self) -> &[&str] {
        &["file"]
    }

    fn retrieve<'a>(
        &'a self,
        uri: &'a Url,
        options: RetrieveOptions<'a>,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            if let Some(referrer) = options.referenced_from {
                if referrer.scheme() != "file" {
                    return Err(Error::CrossSchemeReference {
                        uri: uri.to_string(),
                        referrer: referrer.to_string(),
                    });
                }
            }

            let path = uri
                .to_file_path()
                .map_err(|()| Error::InvalidUri { uri: uri.to_string() })?;

            // Resolve symlinks so the effective URI names the real file;
            // relative references inside it resolve against that location.
            let resolved = tokio::fs::canonicalize(&path).await?;
            let body = tokio::fs::read(&resolved).await?;

            let mut effective = Url::from_file_path(&resolved)
                .map_err(|()| Error::InvalidUri { uri: resolved.display().to_string() })?;
            effective.set_fragment(uri.fragment());

            let mut headers = HeaderMap::new();
            let media_type = resolved
                .extension()
                .and_then(|extension| extension.to_str())
                .and_then(|extension| options.media_types.from_extension(extension));
            if let Some(media_type) = media_type {
                let value = HeaderValue::from_str(media_type)
                    .map_err(|error| Error::Transport { message: error.to_string() })?;
                headers.insert(header::CONTENT_TYPE, value);
            }
            tracing::debug!(path = %resolved.display(), ?media_type, "read file resource");

            Ok(Response::new(StatusCode::OK, headers, effective, Bytes::from(body)))
        })
    }
}
