//! Plain JSON media type plugin.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::media::MediaTypePlugin;
use crate::response::Response;

/// Parses `application/json` bodies. No `$ref` recognition: references
/// only mean something in the JRef dialect, so a plain JSON document never
/// yields reference nodes.
pub struct JsonMediaType;

impl MediaTypePlugin for JsonMediaType {
    fn media_type(&self) -> &str {
        "application/json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    /// Plain JSON ranks below the reference-aware dialect.
    fn quality(&self) -> Option<f32> {
        Some(0.5)
    }

    fn parse(&self, response: &Response) -> Result<Document> {
        let root = jref::parse(response.text()?).map_err(Error::from)?;
        let mut uri = response.url.clone();
        uri.set_fragment(None);
        Ok(Document::new(uri, root))
    }
}
