//! Camel XML DSL (Spring / Blueprint / Camel-K XML).

use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use regex::Regex;
use tracing::debug;

use crate::document::{DocumentSnapshot, TextRange};
use crate::model::{EndpointRole, UriSite};

use super::{short_uri, Declaration, OutlineKind, OutlineNode};

const CAMEL_NAMESPACES: &[&[u8]] = &[
    b"http://camel.apache.org/schema/spring",
    b"http://camel.apache.org/schema/blueprint",
];

/// Elements whose `uri` attribute names an endpoint.
const ENDPOINT_ELEMENTS: &[(&str, Option<EndpointRole>)] = &[
    ("from", Some(EndpointRole::Consumer)),
    ("to", Some(EndpointRole::Producer)),
    ("toD", Some(EndpointRole::Producer)),
    ("wireTap", Some(EndpointRole::Producer)),
    ("enrich", Some(EndpointRole::Producer)),
    ("pollEnrich", Some(EndpointRole::Producer)),
    ("interceptSendToEndpoint", Some(EndpointRole::Producer)),
    ("endpoint", None),
];

/// Elements shown as outline containers.
const OUTLINE_CONTAINERS: &[(&str, OutlineKind)] = &[
    ("camelContext", OutlineKind::Context),
    ("route", OutlineKind::Route),
];

const NO_ID: &str = "<no id>";

/// Inside an attribute value `&` has to be escaped.
const QUERY_SEPARATOR: &str = "&amp;";

static URI_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)uri\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#).unwrap()
});

/// An endpoint tag on a single line whose `uri` value may still be open.
static OPEN_URI_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^<(?:[\w.-]+:)?(?P<name>[A-Za-z]+)\b[^<>]*?\suri\s*=\s*(?:"(?P<dq>[^"]*)|'(?P<sq>[^']*))"#,
    )
    .unwrap()
});

/// A start or empty-element tag.
#[derive(Debug)]
struct Tag {
    local_name: String,
    in_camel_namespace: bool,
    /// From `<` to `>` inclusive.
    span: TextRange,
    id: Option<String>,
}

/// Start tags read before the end of input or the first markup error.
#[derive(Debug, Default)]
struct Scan {
    tags: Vec<Tag>,
    /// Offset of the event that failed to parse.
    error_at: Option<usize>,
}

/// Collect every start tag, stopping quietly at the first markup error
/// (documents are often half-typed).
fn scan(text: &str) -> Scan {
    let mut reader = NsReader::from_str(text);
    reader.config_mut().check_end_names = false;

    let mut scan = Scan::default();
    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) | Ok((ns, Event::Empty(e))) => {
                let in_camel_namespace = matches!(
                    ns,
                    ResolveResult::Bound(Namespace(n)) if CAMEL_NAMESPACES.contains(&n)
                );
                let end = reader.buffer_position() as usize;
                scan.tags
                    .push(tag(&e, in_camel_namespace, TextRange::new(start, end)));
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, offset = start, "stopping XML scan");
                scan.error_at = Some(start);
                break;
            }
        }
    }
    scan
}

fn tag(e: &BytesStart<'_>, in_camel_namespace: bool, span: TextRange) -> Tag {
    let id = e
        .try_get_attribute("id")
        .ok()
        .flatten()
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned());
    Tag {
        local_name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        in_camel_namespace,
        span,
        id,
    }
}

fn endpoint_role(local_name: &str) -> Option<Option<EndpointRole>> {
    ENDPOINT_ELEMENTS
        .iter()
        .find(|(name, _)| *name == local_name)
        .map(|(_, role)| *role)
}

/// The `uri` attribute value of an endpoint tag, with its absolute range.
fn uri_attribute(text: &str, tag: &Tag) -> Option<UriSite> {
    let role = endpoint_role(&tag.local_name)?;
    let raw = tag.span.slice(text)?;
    let caps = URI_ATTRIBUTE.captures(raw)?;
    let value = caps.name("dq").or_else(|| caps.name("sq"))?;
    Some(
        UriSite::new(value.as_str(), tag.span.start + value.start(), role)
            .with_query_separator(QUERY_SEPARATOR),
    )
}

pub(super) fn recognizes(doc: &DocumentSnapshot) -> bool {
    let path = doc.path();
    if !path.ends_with(".xml") {
        return false;
    }
    let tags = scan(doc.text()).tags;
    if tags.iter().any(|t| t.in_camel_namespace) {
        return true;
    }
    path.ends_with(".camelk.xml") && tags.iter().any(|t| uri_attribute(doc.text(), t).is_some())
}

pub(super) fn endpoints(doc: &DocumentSnapshot) -> Vec<UriSite> {
    let text = doc.text();
    scan(text)
        .tags
        .iter()
        .filter_map(|tag| uri_attribute(text, tag))
        .collect()
}

/// The endpoint under `offset`.
///
/// Past a markup error the reader sees nothing, so the cursor line is
/// matched on its own: the last tag opened before the cursor, with a `uri`
/// value running to its quote or the end of the line.
pub(super) fn endpoint_at(doc: &DocumentSnapshot, offset: usize) -> Option<UriSite> {
    let text = doc.text();
    let scan = scan(text);
    let found = scan
        .tags
        .iter()
        .filter_map(|tag| uri_attribute(text, tag))
        .find(|site| site.range.contains(offset));
    if found.is_some() {
        return found;
    }
    if scan.error_at? > offset {
        return None;
    }
    open_endpoint_at(doc, offset)
}

fn open_endpoint_at(doc: &DocumentSnapshot, offset: usize) -> Option<UriSite> {
    let index = &doc.line_index;
    let line = index.line_range(index.line_of(offset))?;
    let before_cursor = doc.text().get(line.start..offset)?;
    let tag_start = line.start + before_cursor.rfind('<')?;
    let caps = OPEN_URI_TAG.captures(doc.text().get(tag_start..line.end)?)?;
    let role = endpoint_role(caps.name("name")?.as_str())?;
    let value = caps.name("dq").or_else(|| caps.name("sq"))?;
    let site = UriSite::new(value.as_str(), tag_start + value.start(), role)
        .with_query_separator(QUERY_SEPARATOR);
    site.range.contains(offset).then_some(site)
}

fn container_kind(local_name: &str) -> Option<OutlineKind> {
    OUTLINE_CONTAINERS
        .iter()
        .find(|(name, _)| *name == local_name)
        .map(|(_, kind)| *kind)
}

/// Attach `node` to the innermost open container, or to the roots.
fn attach(open: &mut [OutlineNode], roots: &mut Vec<OutlineNode>, node: OutlineNode) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Contexts and routes (named by `id`) with their endpoints inside.
///
/// Containers still open at the end of the input or at a markup error run
/// to the end of the text.
pub(super) fn outline(doc: &DocumentSnapshot) -> Vec<OutlineNode> {
    let text = doc.text();
    let mut reader = NsReader::from_str(text);
    reader.config_mut().check_end_names = false;

    let mut roots = Vec::new();
    let mut open: Vec<OutlineNode> = Vec::new();
    // One entry per open element: whether it is an outline container.
    let mut elements: Vec<bool> = Vec::new();
    loop {
        let start = reader.buffer_position() as usize;
        let event = match reader.read_resolved_event() {
            Ok((_, event)) => event,
            Err(e) => {
                debug!(error = %e, offset = start, "stopping XML outline");
                break;
            }
        };
        let span = TextRange::new(start, reader.buffer_position() as usize);
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let tag = tag(e, false, span);
                if let Some(kind) = container_kind(&tag.local_name) {
                    let node = OutlineNode {
                        name: tag.id.clone().unwrap_or_else(|| NO_ID.to_string()),
                        kind,
                        range: span,
                        selection: span,
                        children: Vec::new(),
                    };
                    if is_empty {
                        attach(&mut open, &mut roots, node);
                    } else {
                        open.push(node);
                    }
                } else if let Some(site) = uri_attribute(text, &tag) {
                    let node = OutlineNode {
                        name: format!("{} {}", tag.local_name, short_uri(&site.text)),
                        kind: OutlineKind::Endpoint,
                        range: span,
                        selection: site.range,
                        children: Vec::new(),
                    };
                    attach(&mut open, &mut roots, node);
                }
                if !is_empty {
                    elements.push(container_kind(&tag.local_name).is_some());
                }
            }
            Event::End(_) => {
                if elements.pop() == Some(true) {
                    if let Some(mut node) = open.pop() {
                        node.range = TextRange::new(node.range.start, span.end);
                        attach(&mut open, &mut roots, node);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    while let Some(mut node) = open.pop() {
        node.range = TextRange::new(node.range.start, text.len());
        attach(&mut open, &mut roots, node);
    }
    roots
}

pub(super) fn declarations(doc: &DocumentSnapshot) -> Vec<Declaration> {
    scan(doc.text())
        .tags
        .into_iter()
        .filter_map(|tag| {
            Some(Declaration {
                id: tag.id?,
                range: tag.span,
            })
        })
        .collect()
}
