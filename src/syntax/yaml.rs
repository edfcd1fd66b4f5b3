//! Camel YAML DSL.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::document::DocumentSnapshot;
use crate::model::{EndpointRole, UriSite};

/// Keys that start a route definition.
const ROUTE_KEYS: &[&str] = &[
    "from",
    "route",
    "rest",
    "routeConfiguration",
    "templatedRoute",
    "routeTemplate",
];

/// Suffixes that are always Camel YAML.
const CAMEL_SUFFIXES: &[&str] = &[".camel.yaml", ".camel.yml", ".camelk.yaml", ".camelk.yml"];

/// `key:` at the start of a line, optionally as a sequence item.
static KEY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*(?:-[ \t]+)?)(?P<key>[A-Za-z][\w.-]*)[ \t]*:(?:[ \t]+(?P<value>.*))?$")
        .unwrap()
});

/// A route key as a top-level sequence item, used when the text does not parse.
static ROUTE_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*-[ \t]+(?:from|route|rest|routeConfiguration|templatedRoute|routeTemplate)[ \t]*:",
    )
    .unwrap()
});

fn is_yaml(path: &str) -> bool {
    path.ends_with(".yaml") || path.ends_with(".yml")
}

fn role_of(key: &str) -> Option<EndpointRole> {
    match key {
        "from" => Some(EndpointRole::Consumer),
        "to" | "toD" | "wireTap" | "enrich" | "pollEnrich" | "interceptSendToEndpoint" => {
            Some(EndpointRole::Producer)
        }
        _ => None,
    }
}

fn contains_route_key(value: &Value) -> bool {
    match value {
        Value::Mapping(map) => map.iter().any(|(key, value)| {
            key.as_str().is_some_and(|k| ROUTE_KEYS.contains(&k)) || contains_route_key(value)
        }),
        Value::Sequence(items) => items.iter().any(contains_route_key),
        Value::Tagged(tagged) => contains_route_key(&tagged.value),
        _ => false,
    }
}

pub(super) fn recognizes(doc: &DocumentSnapshot) -> bool {
    let path = doc.path();
    if !is_yaml(&path) {
        return false;
    }
    if CAMEL_SUFFIXES.iter().any(|suffix| path.ends_with(suffix)) {
        return true;
    }
    let text = doc.text();
    let head = text.trim_start();
    if head.starts_with("#!") && head.lines().next().is_some_and(|l| l.contains("camel")) {
        return true;
    }
    if head.starts_with("# camel-k:") || head.starts_with("apiVersion: camel.apache.org/") {
        return true;
    }
    match serde_yaml::from_str::<Value>(text) {
        Ok(value) => contains_route_key(&value),
        Err(_) => ROUTE_ITEM.is_match(text),
    }
}

/// Strip surrounding quotes or a trailing comment from a scalar, returning
/// the byte offset of the URI inside `raw` and its text.
fn scalar(raw: &str) -> Option<(usize, &str)> {
    let quote = raw.chars().next()?;
    if quote == '"' || quote == '\'' {
        let body = &raw[1..];
        let end = body.find(quote).unwrap_or(body.len());
        return Some((1, &body[..end]));
    }
    let end = raw.find(" #").unwrap_or(raw.len());
    let value = raw[..end].trim_end();
    (!value.is_empty()).then_some((0, value))
}

pub(super) fn endpoints(doc: &DocumentSnapshot) -> Vec<UriSite> {
    let text = doc.text();
    let index = &doc.line_index;
    let mut sites = Vec::new();
    // (column of key, role of key) for the keys enclosing the current line
    let mut stack: Vec<(usize, Option<EndpointRole>)> = Vec::new();

    for line in 0..index.line_count() {
        let Some(range) = index.line_range(line) else {
            continue;
        };
        let Some(line_text) = range.slice(text) else {
            continue;
        };
        let Some(caps) = KEY_LINE.captures(line_text) else {
            continue;
        };
        let (Some(indent), Some(key)) = (caps.name("indent"), caps.name("key")) else {
            continue;
        };
        let column = indent.end();
        while stack.last().is_some_and(|(c, _)| *c >= column) {
            stack.pop();
        }

        let key_role = role_of(key.as_str());
        let role = match key.as_str() {
            "uri" => stack.last().and_then(|(_, role)| *role),
            _ => key_role,
        };
        let is_endpoint_key = key.as_str() == "uri" || key_role.is_some();
        stack.push((column, key_role));

        if !is_endpoint_key {
            continue;
        }
        let Some(value) = caps.name("value") else {
            continue;
        };
        if let Some((offset, uri)) = scalar(value.as_str()) {
            if uri.contains(':') || key.as_str() == "uri" {
                sites.push(UriSite::new(uri, range.start + value.start() + offset, role));
            }
        }
    }
    sites
}
