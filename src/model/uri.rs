//! Endpoint URI instance model.
//!
//! `component:path-params?query-params` is broken into a ranged tree. Offsets
//! are accumulated left to right over the original text; placeholders such as
//! `{{host}}` are kept verbatim and never split.

use crate::catalog::{ComponentCatalog, ComponentDescriptor, ParameterDescriptor};
use crate::document::{find_outside_placeholders, split_pieces, Piece, TextRange};

use super::UriSite;

/// Path separators used when the component is not in the catalog.
const DEFAULT_PATH_SEPARATORS: &[char] = &[':', '/'];

/// A parsed endpoint URI.
#[derive(Debug, Clone)]
pub struct CamelUri<'c> {
    pub range: TextRange,
    pub component: ComponentName<'c>,
    pub path_params: Vec<PathParam>,
    /// Offset of the `?` that opens the query, if any.
    pub query_marker: Option<usize>,
    pub query_params: Vec<QueryParam>,
}

#[derive(Debug, Clone)]
pub struct ComponentName<'c> {
    pub name: String,
    pub range: TextRange,
    /// `None` when the scheme is not in the catalog.
    pub descriptor: Option<&'c ComponentDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    /// Position among the path parameters, starting at 0.
    pub index: usize,
    pub value: String,
    pub range: TextRange,
    /// Name of the catalog path option at `index`, when known.
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub key: String,
    pub key_range: TextRange,
    /// `None` when no `=` follows the key.
    pub value: Option<String>,
    pub value_range: Option<TextRange>,
}

impl QueryParam {
    /// Range of the whole `key=value` token.
    pub fn range(&self) -> TextRange {
        let end = self.value_range.map_or(self.key_range.end, |r| r.end);
        TextRange::new(self.key_range.start, end)
    }
}

/// The model node under a cursor.
#[derive(Debug, Clone, Copy)]
pub enum UriElement<'a> {
    Component(&'a ComponentName<'a>),
    PathParam(&'a PathParam),
    QueryKey(&'a QueryParam),
    QueryValue(&'a QueryParam),
}

impl<'c> CamelUri<'c> {
    /// Build the model for a located URI.
    pub fn parse(site: &UriSite, catalog: &'c ComponentCatalog) -> Option<Self> {
        Self::parse_text(&site.text, site.range.start, site.query_separator, catalog)
    }

    /// Build the model for `text` starting at absolute offset `start`.
    ///
    /// Returns `None` when there is no component separator (`:` at a
    /// position greater than zero).
    pub fn parse_text(
        text: &str,
        start: usize,
        query_separator: &str,
        catalog: &'c ComponentCatalog,
    ) -> Option<Self> {
        let colon = find_outside_placeholders(text, ':').filter(|i| *i > 0)?;
        let name = &text[..colon];
        let descriptor = catalog.get(name);
        let component = ComponentName {
            name: name.to_string(),
            range: TextRange::at(start, colon),
            descriptor,
        };

        let rest = &text[colon + 1..];
        let rest_start = start + colon + 1;
        let (path, query) = match find_outside_placeholders(rest, '?') {
            Some(q) => (&rest[..q], Some((rest_start + q, &rest[q + 1..]))),
            None => (rest, None),
        };

        let separators = descriptor
            .map(ComponentDescriptor::path_separators)
            .unwrap_or_else(|| DEFAULT_PATH_SEPARATORS.to_vec());
        let path_params = build_path_params(path, rest_start, &separators, descriptor);

        let (query_marker, query_params) = match query {
            Some((marker, query)) => (
                Some(marker),
                build_query_params(query, marker + 1, query_separator),
            ),
            None => (None, Vec::new()),
        };

        Some(Self {
            range: TextRange::at(start, text.len()),
            component,
            path_params,
            query_marker,
            query_params,
        })
    }

    pub fn descriptor(&self) -> Option<&'c ComponentDescriptor> {
        self.component.descriptor
    }

    /// Find the node containing `offset`.
    pub fn element_at(&self, offset: usize) -> Option<UriElement<'_>> {
        if self.component.range.contains(offset) {
            return Some(UriElement::Component(&self.component));
        }
        if let Some(param) = self.path_params.iter().find(|p| p.range.contains(offset)) {
            return Some(UriElement::PathParam(param));
        }
        for param in &self.query_params {
            if param.key_range.contains(offset) {
                return Some(UriElement::QueryKey(param));
            }
            if param.value_range.is_some_and(|r| r.contains(offset)) {
                return Some(UriElement::QueryValue(param));
            }
        }
        None
    }

    pub fn query_param(&self, key: &str) -> Option<&QueryParam> {
        self.query_params.iter().find(|p| p.key == key)
    }

    /// Catalog descriptor of a path parameter, when both are known.
    pub fn path_descriptor(&self, param: &PathParam) -> Option<&'c ParameterDescriptor> {
        let name = param.name.as_deref()?;
        self.descriptor()?.properties.get(name)
    }

    /// Catalog descriptor of a query option, when both are known.
    pub fn option_descriptor(&self, key: &str) -> Option<&'c ParameterDescriptor> {
        self.descriptor()?.option(key)
    }
}

/// Keep non-empty pieces, plus a trailing empty one so that a cursor right
/// after a separator still has a node to complete into.
fn significant<'a>(pieces: Vec<Piece<'a>>) -> impl Iterator<Item = Piece<'a>> {
    let last = pieces.len().saturating_sub(1);
    pieces
        .into_iter()
        .enumerate()
        .filter(move |(i, p)| !p.text.is_empty() || *i == last)
        .map(|(_, p)| p)
}

fn build_path_params(
    path: &str,
    start: usize,
    separators: &[char],
    descriptor: Option<&ComponentDescriptor>,
) -> Vec<PathParam> {
    let pieces = split_pieces(path, start, |rest| {
        rest.starts_with(separators).then_some(1)
    });
    let names: Vec<&str> = descriptor
        .map(|d| d.path_parameters().map(|(name, _)| name).collect())
        .unwrap_or_default();

    significant(pieces)
        .enumerate()
        .map(|(index, piece)| PathParam {
            index,
            value: piece.text.to_string(),
            range: piece.range,
            name: names.get(index).map(|n| n.to_string()),
        })
        .collect()
}

fn build_query_params(query: &str, start: usize, separator: &str) -> Vec<QueryParam> {
    let pieces = split_pieces(query, start, |rest| {
        rest.starts_with(separator).then_some(separator.len())
    });

    significant(pieces)
        .map(|piece| match find_outside_placeholders(piece.text, '=') {
            Some(eq) => {
                let value_start = piece.range.start + eq + 1;
                QueryParam {
                    key: piece.text[..eq].to_string(),
                    key_range: TextRange::at(piece.range.start, eq),
                    value: Some(piece.text[eq + 1..].to_string()),
                    value_range: Some(TextRange::new(value_start, piece.range.end)),
                }
            }
            None => QueryParam {
                key: piece.text.to_string(),
                key_range: piece.range,
                value: None,
                value_range: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEPARATORS: &[&str] = &[":", "/", "?", "&", "&amp;", "="];

    fn catalog() -> ComponentCatalog {
        ComponentCatalog::builtin().unwrap()
    }

    /// Rebuild the source from the model ranges, checking that every gap
    /// between two nodes is a known separator.
    fn reassemble(uri: &CamelUri<'_>, source: &str) -> String {
        let mut ranges = vec![uri.component.range];
        ranges.extend(uri.path_params.iter().map(|p| p.range));
        for param in &uri.query_params {
            ranges.push(param.key_range);
            ranges.extend(param.value_range);
        }

        let mut out = String::new();
        let mut cursor = uri.range.start;
        for range in ranges {
            let gap = &source[cursor..range.start];
            assert!(
                gap.is_empty() || gap.split_inclusive(['/', ':']).all(|g| SEPARATORS.contains(&g)),
                "unexpected gap {:?}",
                gap
            );
            out.push_str(gap);
            out.push_str(range.slice(source).unwrap());
            cursor = range.end;
        }
        out.push_str(&source[cursor..uri.range.end]);
        out
    }

    #[test]
    fn no_colon_yields_none() {
        let catalog = catalog();
        assert!(CamelUri::parse_text("timer", 0, "&", &catalog).is_none());
        assert!(CamelUri::parse_text(":timer", 0, "&", &catalog).is_none());
    }

    #[test]
    fn simple_uri_ranges() {
        let catalog = catalog();
        let text = "timer:foo?period=1000&delay=5";
        let uri = CamelUri::parse_text(text, 10, "&", &catalog).unwrap();

        assert_eq!(uri.component.name, "timer");
        assert_eq!(uri.component.range, TextRange::new(10, 15));
        assert!(uri.descriptor().is_some());

        assert_eq!(uri.path_params.len(), 1);
        assert_eq!(uri.path_params[0].value, "foo");
        assert_eq!(uri.path_params[0].name.as_deref(), Some("timerName"));
        assert_eq!(uri.path_params[0].range, TextRange::new(16, 19));

        assert_eq!(uri.query_marker, Some(19));
        let period = uri.query_param("period").unwrap();
        assert_eq!(period.key_range, TextRange::new(20, 26));
        assert_eq!(period.value.as_deref(), Some("1000"));
        assert_eq!(period.value_range, Some(TextRange::new(27, 31)));
        let delay = uri.query_param("delay").unwrap();
        assert_eq!(delay.range(), TextRange::new(32, 39));
    }

    #[test]
    fn round_trip_reconstructs_source() {
        let catalog = catalog();
        let samples = [
            ("timer:foo?period=1000&delay=5", "&"),
            ("jms:queue:orders?concurrentConsumers=2", "&"),
            ("file:/tmp/in?noop=true&amp;recursive=true", "&amp;"),
            ("unknown:a/b:c?x=1&y", "&"),
            ("kafka:{{topic}}?brokers={{host:port}}&groupId=g", "&"),
            ("log:", "&"),
            ("direct:start?", "&"),
        ];
        for (text, separator) in samples {
            let source = format!("   {}  ", text);
            let uri = CamelUri::parse_text(text, 3, separator, &catalog).unwrap();
            assert_eq!(reassemble(&uri, &source), text);
        }
    }

    #[test]
    fn path_split_by_declared_separators() {
        let catalog = catalog();
        let uri = CamelUri::parse_text("jms:topic:news", 0, "&", &catalog).unwrap();
        let values: Vec<_> = uri.path_params.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["topic", "news"]);
        assert_eq!(uri.path_params[1].index, 1);
        assert_eq!(uri.path_params[1].name.as_deref(), Some("destinationName"));

        // A single declared path option keeps slashes inside one parameter.
        let uri = CamelUri::parse_text("file:/tmp/in", 0, "&", &catalog).unwrap();
        assert_eq!(uri.path_params.len(), 1);
        assert_eq!(uri.path_params[0].value, "/tmp/in");
    }

    #[test]
    fn unknown_component_uses_default_separators() {
        let catalog = catalog();
        let uri = CamelUri::parse_text("foo:a/b:c", 0, "&", &catalog).unwrap();
        assert!(uri.descriptor().is_none());
        let values: Vec<_> = uri.path_params.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
        assert!(uri.path_params.iter().all(|p| p.name.is_none()));
    }

    #[test]
    fn placeholders_are_not_split() {
        let catalog = catalog();
        let uri =
            CamelUri::parse_text("kafka:{{topic}}?brokers={{host:9092}}", 0, "&", &catalog).unwrap();
        assert_eq!(uri.path_params[0].value, "{{topic}}");
        assert_eq!(
            uri.query_param("brokers").unwrap().value.as_deref(),
            Some("{{host:9092}}")
        );
    }

    #[test]
    fn trailing_separator_leaves_empty_param() {
        let catalog = catalog();
        let uri = CamelUri::parse_text("timer:foo?period=1&", 0, "&", &catalog).unwrap();
        assert_eq!(uri.query_params.len(), 2);
        let last = &uri.query_params[1];
        assert_eq!(last.key, "");
        assert_eq!(last.key_range, TextRange::new(19, 19));
        assert!(last.value.is_none());
    }

    #[test]
    fn xml_escaped_separator() {
        let catalog = catalog();
        let text = "timer:foo?period=1&amp;delay=2";
        let uri = CamelUri::parse_text(text, 0, "&amp;", &catalog).unwrap();
        let keys: Vec<_> = uri.query_params.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["period", "delay"]);
        assert_eq!(uri.query_params[1].key_range, TextRange::new(23, 28));
    }

    #[test]
    fn element_at_classifies_cursor() {
        let catalog = catalog();
        let uri = CamelUri::parse_text("timer:foo?period=10", 0, "&", &catalog).unwrap();
        assert!(matches!(uri.element_at(2), Some(UriElement::Component(_))));
        assert!(matches!(uri.element_at(7), Some(UriElement::PathParam(_))));
        assert!(matches!(uri.element_at(12), Some(UriElement::QueryKey(_))));
        assert!(matches!(uri.element_at(16), Some(UriElement::QueryKey(_))));
        assert!(matches!(uri.element_at(17), Some(UriElement::QueryValue(_))));
        assert!(matches!(uri.element_at(19), Some(UriElement::QueryValue(_))));
    }
}
