//! Browser integration tests over an in-memory URI scheme plugin.
//!
//! Covers retrieval, caching, embedded-document precedence, anchor and
//! fragment-kind handling, reference chains across documents, error
//! wrapping, and the navigation primitives.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use futures::future::BoxFuture;
use hashbrown::HashMap;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use url::Url;

use hyperjump::{
    Browser, Document, Error, FragmentKind, JrefMediaType, JsonMediaType, MediaTypePlugin,
    Response, Result, RetrieveOptions, UriSchemePlugin,
};

/// Serves scripted bodies by URI and counts retrievals.
struct MemoryScheme {
    responses: HashMap<String, (String, String)>,
    retrievals: AtomicUsize,
}

impl MemoryScheme {
    fn new(entries: &[(&str, &str, &str)]) -> Arc<Self> {
        let responses = entries
            .iter()
            .map(|(uri, content_type, body)| {
                ((*uri).to_string(), ((*content_type).to_string(), (*body).to_string()))
            })
            .collect();
        Arc::new(Self { responses, retrievals: AtomicUsize::new(0) })
    }

    fn retrievals(&self) -> usize {
        self.retrievals.load(Ordering::SeqCst)
    }
}

impl UriSchemePlugin for MemoryScheme {
    fn schemes(&self) -> &[&str] {
        &["https"]
    }

    fn retrieve<'a>(
        &'a self,
        uri: &'a Url,
        _options: RetrieveOptions<'a>,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            self.retrievals.fetch_add(1, Ordering::SeqCst);
            let mut id = uri.clone();
            id.set_fragment(None);
            let (content_type, body) = self
                .responses
                .get(id.as_str())
                .ok_or_else(|| Error::Transport {
                    message: format!("no scripted response for '{id}'"),
                })?;

            let mut headers = HeaderMap::new();
            if !content_type.is_empty() {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_str(content_type).expect("scripted content type"),
                );
            }
            Ok(Response::new(StatusCode::OK, headers, id, Bytes::from(body.clone())))
        })
    }
}

fn browser(scheme: Arc<MemoryScheme>) -> Browser {
    let mut browser = Browser::new();
    browser.add_media_type(Arc::new(JrefMediaType));
    browser.add_media_type(Arc::new(JsonMediaType));
    browser.add_uri_scheme(scheme);
    browser
}

const JREF: &str = "application/reference+json";

#[tokio::test]
async fn get_dereferences_a_local_reference() {
    let scheme = MemoryScheme::new(&[(
        "https://h/d",
        JREF,
        r##"{"foo": 42, "bar": {"$ref": "#/foo"}}"##,
    )]);
    let browser = browser(Arc::clone(&scheme));

    let node = browser.get("https://h/d#/bar").await.expect("should resolve");
    assert_eq!(node.as_f64(), Some(42.0));
}

#[tokio::test]
async fn step_dereferences_after_indexing() {
    let scheme = MemoryScheme::new(&[(
        "https://h/d",
        JREF,
        r##"{"foo": 42, "bar": {"$ref": "#/foo"}}"##,
    )]);
    let browser = browser(Arc::clone(&scheme));

    let root = browser.get("https://h/d").await.expect("should resolve");
    let node = browser.step("bar", &root).await.expect("should step");
    assert_eq!(node.as_f64(), Some(42.0));
}

#[tokio::test]
async fn reference_chains_cross_documents() {
    let scheme = MemoryScheme::new(&[
        ("https://h/a", JREF, r#"{"x": {"$ref": "https://h/b#/y"}}"#),
        ("https://h/b", JREF, r##"{"y": {"$ref": "#/z"}, "z": "end"}"##),
    ]);
    let browser = browser(Arc::clone(&scheme));

    let node = browser.get("https://h/a#/x").await.expect("should resolve");
    assert_eq!(node.as_str(), Some("end"));
    // One retrieval per document; the local hop in B hits the cache.
    assert_eq!(scheme.retrievals(), 2);
}

#[tokio::test]
async fn cache_hits_do_not_retrieve_again() {
    let scheme = MemoryScheme::new(&[("https://h/d", JREF, r#"{"foo": 1}"#)]);
    let browser = browser(Arc::clone(&scheme));

    browser.get("https://h/d#/foo").await.expect("first get");
    browser.get("https://h/d").await.expect("second get");
    assert_eq!(scheme.retrievals(), 1);
}

#[tokio::test]
async fn duplicate_keys_resolve_to_the_last_member() {
    let scheme = MemoryScheme::new(&[("https://h/d", JREF, r#"{"a": 1, "a": 2}"#)]);
    let browser = browser(Arc::clone(&scheme));

    let node = browser.get("https://h/d#/a").await.expect("should resolve");
    assert_eq!(node.as_f64(), Some(2.0));
}

#[tokio::test]
async fn relative_get_resolves_against_the_context_uri() {
    let scheme = MemoryScheme::new(&[("https://h/d", JREF, r#"{"foo": 1}"#)]);
    let mut browser = browser(Arc::clone(&scheme));
    browser.set_context_uri(Url::parse("https://h/").expect("context uri"));

    let node = browser.get("d#/foo").await.expect("should resolve");
    assert_eq!(node.as_f64(), Some(1.0));
}

/// Parses a bundle convention for tests:
/// `{"root": <jref>, "embedded": {"<uri>": <jref>, ...}}`.
struct BundleMediaType;

impl MediaTypePlugin for BundleMediaType {
    fn media_type(&self) -> &str {
        "application/prs.bundle+json"
    }

    fn extensions(&self) -> &[&str] {
        &[]
    }

    fn parse(&self, response: &Response) -> Result<Document> {
        let mut uri = response.url.clone();
        uri.set_fragment(None);
        let node = jref::from_jref(response.text()?, &uri)?;
        let root = node.get("root").cloned().unwrap_or_else(jref::Node::null);
        let mut document = Document::new(uri, root);
        if let Some(members) = node.get("embedded").and_then(jref::Node::as_object) {
            for member in members {
                let embedded_uri =
                    Url::parse(&member.key.name).expect("embedded uri should parse");
                document = document.with_embedded(Document::new(embedded_uri, member.value.clone()));
            }
        }
        Ok(document)
    }
}

fn bundle_fixture() -> (Arc<MemoryScheme>, Browser) {
    let scheme = MemoryScheme::new(&[
        (
            "https://host/bundle",
            "application/prs.bundle+json",
            r#"{
                "root": {"w": {"$ref": "https://host/widget"}},
                "embedded": {"https://host/widget": {"from": "embedded"}}
            }"#,
        ),
        ("https://host/widget", JREF, r#"{"from": "network"}"#),
    ]);
    let mut browser = browser(Arc::clone(&scheme));
    browser.add_media_type(Arc::new(BundleMediaType));
    (scheme, browser)
}

#[tokio::test]
async fn embedded_documents_resolve_without_retrieval() {
    let (scheme, browser) = bundle_fixture();

    let node = browser.get("https://host/bundle#/w").await.expect("should resolve");
    assert_eq!(node.get("from").and_then(jref::Node::as_str), Some("embedded"));
    // Only the bundle itself was retrieved.
    assert_eq!(scheme.retrievals(), 1);
}

#[tokio::test]
async fn cached_documents_shadow_embedded_ones() {
    let (scheme, browser) = bundle_fixture();

    // Retrieve the widget independently first, then reach it through the
    // bundle's reference.
    browser.get("https://host/widget").await.expect("independent get");
    let node = browser.get("https://host/bundle#/w").await.expect("should resolve");
    assert_eq!(node.get("from").and_then(jref::Node::as_str), Some("network"));
    assert_eq!(scheme.retrievals(), 2);
}

/// JRef with a declared named anchor.
struct AnchoredMediaType;

impl MediaTypePlugin for AnchoredMediaType {
    fn media_type(&self) -> &str {
        "application/prs.anchored+json"
    }

    fn extensions(&self) -> &[&str] {
        &[]
    }

    fn parse(&self, response: &Response) -> Result<Document> {
        let mut uri = response.url.clone();
        uri.set_fragment(None);
        let root = jref::from_jref(response.text()?, &uri)?;
        Ok(Document::new(uri, root).with_anchor("main", "/foo"))
    }
}

#[tokio::test]
async fn anchor_fragments_substitute_their_pointer() {
    let scheme = MemoryScheme::new(&[(
        "https://h/anchored",
        "application/prs.anchored+json",
        r#"{"foo": "found"}"#,
    )]);
    let mut browser = browser(Arc::clone(&scheme));
    browser.add_media_type(Arc::new(AnchoredMediaType));

    let node = browser.get("https://h/anchored#main").await.expect("should resolve");
    assert_eq!(node.as_str(), Some("found"));

    // Plain pointer fragments still work alongside anchors.
    let node = browser.get("https://h/anchored#/foo").await.expect("should resolve");
    assert_eq!(node.as_str(), Some("found"));
}

/// A document whose fragments carry no pointer semantics.
struct OpaqueFragmentMediaType;

impl MediaTypePlugin for OpaqueFragmentMediaType {
    fn media_type(&self) -> &str {
        "application/prs.opaque+json"
    }

    fn extensions(&self) -> &[&str] {
        &[]
    }

    fn parse(&self, response: &Response) -> Result<Document> {
        let mut uri = response.url.clone();
        uri.set_fragment(None);
        let root = jref::from_jref(response.text()?, &uri)?;
        Ok(Document::new(uri, root).with_fragment_kind(FragmentKind::Other))
    }
}

#[tokio::test]
async fn non_pointer_fragments_address_the_root() {
    let scheme = MemoryScheme::new(&[(
        "https://h/opaque",
        "application/prs.opaque+json",
        r#"{"a": 1}"#,
    )]);
    let mut browser = browser(Arc::clone(&scheme));
    browser.add_media_type(Arc::new(OpaqueFragmentMediaType));

    let node = browser.get("https://h/opaque#anything").await.expect("should resolve");
    assert_eq!(node.kind(), "object");
    assert_eq!(node.get("a").and_then(jref::Node::as_f64), Some(1.0));
}

#[tokio::test]
async fn unsupported_scheme_is_a_wrapped_retrieval_error() {
    let browser = browser(MemoryScheme::new(&[("https://h/unused", JREF, "{}")]));
    let error = browser.get("ftp://h/d").await.expect_err("should fail");
    match error.cause() {
        Some(Error::UnsupportedUriScheme { scheme }) => assert_eq!(scheme, "ftp"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn missing_content_type_is_a_wrapped_retrieval_error() {
    let scheme = MemoryScheme::new(&[("https://h/d", "", r#"{}"#)]);
    let browser = browser(scheme);
    let error = browser.get("https://h/d").await.expect_err("should fail");
    assert!(matches!(error.cause(), Some(Error::UnknownMediaType { .. })));
}

#[tokio::test]
async fn unmatched_content_type_is_a_wrapped_retrieval_error() {
    let scheme = MemoryScheme::new(&[("https://h/d", "text/html", "<html>")]);
    let browser = browser(scheme);
    let error = browser.get("https://h/d").await.expect_err("should fail");
    match error.cause() {
        Some(Error::UnsupportedMediaType { media_type }) => {
            assert_eq!(media_type, "text/html");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn syntax_errors_propagate_unwrapped() {
    let scheme = MemoryScheme::new(&[("https://h/d", JREF, "{invalid")]);
    let browser = browser(scheme);
    let error = browser.get("https://h/d").await.expect_err("should fail");
    assert!(matches!(error, Error::Jref(_)));
}

#[tokio::test]
async fn pointer_errors_propagate_unwrapped() {
    let scheme = MemoryScheme::new(&[("https://h/d", JREF, r#"{"foo": 1}"#)]);
    let browser = browser(scheme);
    let error = browser.get("https://h/d#/nope").await.expect_err("should fail");
    assert!(matches!(error, Error::Pointer(_)));
}

fn navigation_fixture() -> Browser {
    browser(MemoryScheme::new(&[(
        "https://h/nav",
        JREF,
        r##"{
            "nums": [1, {"$ref": "#/target"}, 3],
            "obj": {"a": {"$ref": "#/target"}, "b": 2},
            "target": 42
        }"##,
    )]))
}

#[tokio::test]
async fn iter_dereferences_array_items_in_order() {
    let browser = navigation_fixture();
    let nums = browser.get("https://h/nav#/nums").await.expect("should resolve");

    let mut iter = browser.iter(&nums).expect("array node");
    let mut seen = Vec::new();
    while let Some(item) = iter.next().await {
        seen.push(item.expect("item should resolve").as_f64().expect("number"));
    }
    assert_eq!(seen, vec![1.0, 42.0, 3.0]);
}

#[tokio::test]
async fn cursors_restart_per_call() {
    let browser = navigation_fixture();
    let nums = browser.get("https://h/nav#/nums").await.expect("should resolve");

    for _ in 0..2 {
        let mut iter = browser.iter(&nums).expect("array node");
        let first = iter.next().await.expect("has items").expect("resolves");
        assert_eq!(first.as_f64(), Some(1.0));
    }
}

#[tokio::test]
async fn entries_and_values_dereference_members() {
    let browser = navigation_fixture();
    let obj = browser.get("https://h/nav#/obj").await.expect("should resolve");

    let mut entries = browser.entries(&obj).expect("object node");
    let (name, node) = entries.next().await.expect("has members").expect("resolves");
    assert_eq!(name, "a");
    assert_eq!(node.as_f64(), Some(42.0));
    let (name, node) = entries.next().await.expect("has members").expect("resolves");
    assert_eq!(name, "b");
    assert_eq!(node.as_f64(), Some(2.0));
    assert!(entries.next().await.is_none());

    let mut values = browser.values(&obj).expect("object node");
    assert_eq!(
        values.next().await.expect("first").expect("resolves").as_f64(),
        Some(42.0)
    );
}

#[tokio::test]
async fn local_primitives_do_not_retrieve() {
    let browser = navigation_fixture();
    let root = browser.get("https://h/nav").await.expect("should resolve");

    let names: Vec<&str> = hyperjump::keys(&root).expect("object node").collect();
    assert_eq!(names, vec!["nums", "obj", "target"]);

    assert!(hyperjump::has("target", &root));
    assert!(!hyperjump::has("missing", &root));

    let nums = root.get("nums").expect("nums");
    assert_eq!(hyperjump::length(nums).expect("array node"), 3);
    assert_eq!(hyperjump::type_of(nums), "array");

    // The unfollowed reference is still visible to local primitives.
    let raw = nums.as_array().expect("array")[1].clone();
    assert_eq!(hyperjump::type_of(&raw), "reference");
    assert!(matches!(
        hyperjump::value(&raw),
        Err(Error::NotAScalar { kind: "reference" })
    ));

    let target = root.get("target").expect("target");
    assert!(matches!(
        hyperjump::value(target).expect("scalar"),
        jref::Value::Number(_)
    ));

    assert!(matches!(
        hyperjump::length(&root),
        Err(Error::NotAnArray { kind: "object" })
    ));
    assert!(matches!(
        browser.iter(&root),
        Err(Error::NotAnArray { kind: "object" })
    ));
}
