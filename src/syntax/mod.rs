//! Concrete route syntaxes and the detector that picks one per document.
//!
//! Each syntax answers the same three questions: does this document look like
//! routes written in me, where are the endpoint URIs, and which elements
//! declare an identifier. Detection tries them in a fixed priority order.

mod java;
pub mod modeline;
pub mod properties;
mod xml;
mod yaml;

use std::fmt;

use tracing::warn;

use crate::document::{DocumentSnapshot, TextRange};
use crate::model::UriSite;

pub use modeline::{Modeline, ModelineOption, TraitOption};
pub use properties::ComponentProperty;

/// What an outline entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineKind {
    /// A `camelContext`.
    Context,
    Route,
    Endpoint,
}

/// One entry of a document's route outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub name: String,
    pub kind: OutlineKind,
    /// The whole construct.
    pub range: TextRange,
    /// The part to reveal when the entry is picked.
    pub selection: TextRange,
    pub children: Vec<OutlineNode>,
}

/// `scheme:path` of a URI, without its query.
pub(crate) fn short_uri(uri: &str) -> &str {
    uri.split_once('?').map_or(uri, |(short, _)| short)
}

/// An element carrying an identifier that URIs can refer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    Xml,
    Yaml,
    Java,
}

impl Syntax {
    /// Order in which recognizers are tried.
    pub const PRIORITY: [Syntax; 3] = [Syntax::Xml, Syntax::Yaml, Syntax::Java];

    /// Structural check: does the document contain routes in this syntax?
    pub fn recognizes(self, doc: &DocumentSnapshot) -> bool {
        match self {
            Syntax::Xml => xml::recognizes(doc),
            Syntax::Yaml => yaml::recognizes(doc),
            Syntax::Java => java::recognizes(doc),
        }
    }

    /// Every endpoint URI in the document, in document order.
    pub fn endpoints(self, doc: &DocumentSnapshot) -> Vec<UriSite> {
        match self {
            Syntax::Xml => xml::endpoints(doc),
            Syntax::Yaml => yaml::endpoints(doc),
            Syntax::Java => java::endpoints(doc),
        }
    }

    /// The endpoint URI whose text contains `offset`.
    pub fn endpoint_at(self, doc: &DocumentSnapshot, offset: usize) -> Option<UriSite> {
        match self {
            Syntax::Xml => xml::endpoint_at(doc, offset),
            Syntax::Yaml | Syntax::Java => self
                .endpoints(doc)
                .into_iter()
                .find(|site| site.range.contains(offset)),
        }
    }

    /// Identifier-bearing declarations, in document order. Only the XML
    /// syntax has them.
    pub fn declarations(self, doc: &DocumentSnapshot) -> Vec<Declaration> {
        match self {
            Syntax::Xml => xml::declarations(doc),
            Syntax::Yaml | Syntax::Java => Vec::new(),
        }
    }

    /// Routes and their endpoints, nested. YAML documents have no outline.
    pub fn outline(self, doc: &DocumentSnapshot) -> Vec<OutlineNode> {
        match self {
            Syntax::Xml => xml::outline(doc),
            Syntax::Java => java::outline(doc),
            Syntax::Yaml => Vec::new(),
        }
    }

    /// Pick the first syntax in priority order that recognizes the document.
    pub fn detect(doc: &DocumentSnapshot) -> Option<Syntax> {
        let mut matching = Self::PRIORITY.into_iter().filter(|s| s.recognizes(doc));
        let chosen = matching.next()?;
        for other in matching {
            warn!(
                uri = %doc.uri,
                %chosen,
                also = %other,
                "document matches more than one route syntax"
            );
        }
        Some(chosen)
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Syntax::Xml => "xml",
            Syntax::Yaml => "yaml",
            Syntax::Java => "java",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Url;

    fn doc(name: &str, text: &str) -> DocumentSnapshot {
        let uri = Url::parse(&format!("file:///ws/{}", name)).unwrap();
        DocumentSnapshot::new(uri, text.to_string(), 0)
    }

    #[test]
    fn detects_each_syntax() {
        let xml = doc(
            "r.xml",
            r#"<routes xmlns="http://camel.apache.org/schema/spring"><route><from uri="timer:a"/></route></routes>"#,
        );
        let yaml = doc("r.yaml", "- from:\n    uri: timer:a\n");
        let java = doc("R.java", "from(\"timer:a\").to(\"log:b\");");
        assert_eq!(Syntax::detect(&xml), Some(Syntax::Xml));
        assert_eq!(Syntax::detect(&yaml), Some(Syntax::Yaml));
        assert_eq!(Syntax::detect(&java), Some(Syntax::Java));
    }

    #[test]
    fn vocabulary_without_structure_matches_nothing() {
        for name in ["notes.xml", "notes.yaml", "Notes.java", "notes.txt"] {
            let d = doc(name, "camel routes go from timer:foo to log:bar\n");
            assert_eq!(Syntax::detect(&d), None, "{}", name);
        }
    }

    #[test]
    fn endpoint_at_cursor() {
        let text = "from(\"timer:a\").to(\"log:b\");";
        let d = doc("R.java", text);
        let site = Syntax::Java.endpoint_at(&d, 21).unwrap();
        assert_eq!(site.text, "log:b");
        assert!(Syntax::Java.endpoint_at(&d, 0).is_none());
    }

    #[test]
    fn short_uri_drops_query() {
        assert_eq!(short_uri("timer:a?period=1"), "timer:a");
        assert_eq!(short_uri("log:b"), "log:b");
    }

    #[test]
    fn only_xml_has_declarations() {
        let d = doc("R.java", "from(\"timer:a\").id(\"x\").to(\"log:b\");");
        assert!(Syntax::Java.declarations(&d).is_empty());
    }
}
