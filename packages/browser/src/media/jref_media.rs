//! JRef media type plugin.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::media::MediaTypePlugin;
use crate::response::Response;

/// Parses `application/reference+json` bodies: JSON where any
/// `{"$ref": "<uri>"}` object becomes a reference node, resolved absolute
/// against the response URL.
pub struct JrefMediaType;

impl MediaTypePlugin for JrefMediaType {
    fn media_type(&self) -> &str {
        "application/reference+json"
    }

    fn extensions(&self) -> &[&str] {
        &["jref"]
    }

    fn parse(&self, response: &Response) -> Result<Document> {
        let mut uri = response.url.clone();
        uri.set_fragment(None);
        let root = jref::from_jref(response.text()?, &uri).map_err(Error::from)?;
        Ok(Document::new(uri, root))
    }
}
