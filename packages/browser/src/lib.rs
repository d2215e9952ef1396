//! # Hyperjump
//!
//! A lazy, multi-document JSON Reference browser.
//!
//! [`Browser`] retrieves documents through pluggable URI-scheme plugins,
//! parses them through pluggable media-type plugins, caches them per
//! instance, and follows `{"$ref": "<uri>"}` chains across any number of
//! documents until a concrete value is reached. Navigation primitives
//! ([`Browser::step`], [`Browser::iter`], [`Browser::entries`], ...)
//! always hand back fully dereferenced nodes.
//!
//! ## Usage
//!
//! ```no_run
//! use hyperjump::Browser;
//!
//! # async fn example() -> hyperjump::Result<()> {
//! let browser = Browser::default();
//! let node = browser.get("https://example.com/schemas/root#/definitions/name").await?;
//! println!("resolved a {} node", node.kind());
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod browser;
pub mod document;
pub mod error;
pub mod media;
pub mod navigation;
pub mod response;
pub mod scheme;

// The AST layer, re-exported so consumers can name node types without a
// separate dependency.
pub use jref;

pub use browser::Browser;
pub use document::{Document, FragmentKind};
pub use error::{Error, Result};
pub use media::{JrefMediaType, JsonMediaType, MediaTypePlugin, MediaTypeRegistry, mime_match};
pub use navigation::{Entries, Iter, Values, has, keys, length, type_of, value};
pub use response::Response;
pub use scheme::{
    Fetch, FileScheme, HttpScheme, HttpSchemeConfig, HyperFetch, RetrieveOptions, SchemeRegistry,
    UriSchemePlugin,
};
