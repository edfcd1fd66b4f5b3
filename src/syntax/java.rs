//! Java / Groovy route builders: URIs are string literals passed to the
//! fluent endpoint methods.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{DocumentSnapshot, TextRange};
use crate::model::{EndpointRole, UriSite};

use super::{short_uri, OutlineKind, OutlineNode};

const SUFFIXES: &[&str] = &[".java", ".groovy"];

/// A route start: `from("...")`.
static ROUTE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bfrom\s*\(\s*""#).unwrap());

/// A chained producer call: `.to("...")`, `.toD("...")`, ...
static ROUTE_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\.\s*(?:to|toD|toF|wireTap|enrich|pollEnrich)\s*\(\s*""#).unwrap()
});

/// First string argument of an endpoint method. The closing quote is
/// optional so a literal that is still being typed is found too.
static ENDPOINT_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?P<method>fromF|from|toD|toF|to|wireTap|enrich|pollEnrich|interceptSendToEndpoint)\s*\(\s*"(?P<uri>(?:[^"\\\n]|\\.)*)"#,
    )
    .unwrap()
});

pub(super) fn recognizes(doc: &DocumentSnapshot) -> bool {
    let path = doc.path();
    if !SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
        return false;
    }
    let text = doc.text();
    ROUTE_START.is_match(text) && ROUTE_STEP.is_match(text)
}

/// An endpoint method call and the URI literal it receives.
struct EndpointCall<'t> {
    method: &'t str,
    /// From the method name to the end of the literal.
    range: TextRange,
    site: UriSite,
}

fn endpoint_calls(text: &str) -> Vec<EndpointCall<'_>> {
    ENDPOINT_CALL
        .captures_iter(text)
        .filter_map(|caps| {
            let method = caps.name("method")?;
            let uri = caps.name("uri")?;
            let role = if method.as_str().starts_with("from") {
                EndpointRole::Consumer
            } else {
                EndpointRole::Producer
            };
            Some(EndpointCall {
                method: method.as_str(),
                range: TextRange::new(method.start(), uri.end()),
                site: UriSite::new(uri.as_str(), uri.start(), Some(role)),
            })
        })
        .collect()
}

pub(super) fn endpoints(doc: &DocumentSnapshot) -> Vec<UriSite> {
    endpoint_calls(doc.text())
        .into_iter()
        .map(|call| call.site)
        .collect()
}

/// Each `from` opens a route holding the calls that follow it.
pub(super) fn outline(doc: &DocumentSnapshot) -> Vec<OutlineNode> {
    let mut roots: Vec<OutlineNode> = Vec::new();
    let mut route: Option<OutlineNode> = None;
    for call in endpoint_calls(doc.text()) {
        let node = OutlineNode {
            name: format!("{} {}", call.method, short_uri(&call.site.text)),
            kind: OutlineKind::Endpoint,
            range: call.range,
            selection: call.site.range,
            children: Vec::new(),
        };
        if call.site.role == Some(EndpointRole::Consumer) {
            roots.extend(route.take());
            route = Some(OutlineNode {
                kind: OutlineKind::Route,
                ..node
            });
        } else if let Some(route) = route.as_mut() {
            route.range = TextRange::new(route.range.start, node.range.end);
            route.children.push(node);
        } else {
            roots.push(node);
        }
    }
    roots.extend(route);
    roots
}
