//! Document symbols: the route outline of a document.

use tower_lsp::lsp_types::{DocumentSymbol, DocumentSymbolResponse, SymbolKind};

use crate::document::{DocumentSnapshot, LineIndex};
use crate::syntax::{OutlineKind, OutlineNode, Syntax};

fn symbol_kind(kind: OutlineKind) -> SymbolKind {
    match kind {
        OutlineKind::Context => SymbolKind::NAMESPACE,
        OutlineKind::Route => SymbolKind::FUNCTION,
        OutlineKind::Endpoint => SymbolKind::FIELD,
    }
}

fn to_symbol(node: OutlineNode, line_index: &LineIndex) -> DocumentSymbol {
    let children: Vec<DocumentSymbol> = node
        .children
        .into_iter()
        .map(|child| to_symbol(child, line_index))
        .collect();

    #[allow(deprecated)]
    let symbol = DocumentSymbol {
        name: node.name,
        detail: None,
        kind: symbol_kind(node.kind),
        tags: None,
        deprecated: None,
        range: line_index.to_lsp_range(node.range),
        selection_range: line_index.to_lsp_range(node.selection),
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
    };
    symbol
}

/// Nested symbols for the routes of a document.
pub fn document_symbols(doc: &DocumentSnapshot) -> Option<DocumentSymbolResponse> {
    let symbols: Vec<DocumentSymbol> = Syntax::detect(doc)?
        .outline(doc)
        .into_iter()
        .map(|node| to_symbol(node, &doc.line_index))
        .collect();
    if symbols.is_empty() {
        return None;
    }
    Some(DocumentSymbolResponse::Nested(symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{Position, Url};

    fn doc(name: &str, text: &str) -> DocumentSnapshot {
        let uri = Url::parse(&format!("file:///ws/{}", name)).unwrap();
        DocumentSnapshot::new(uri, text.to_string(), 0)
    }

    fn nested(response: Option<DocumentSymbolResponse>) -> Vec<DocumentSymbol> {
        match response {
            Some(DocumentSymbolResponse::Nested(symbols)) => symbols,
            _ => Vec::new(),
        }
    }

    #[test]
    fn xml_routes_and_endpoints() {
        let text = "<routes xmlns=\"http://camel.apache.org/schema/spring\">\n  <route id=\"a\">\n    <from uri=\"timer:t\"/>\n  </route>\n</routes>";
        let symbols = nested(document_symbols(&doc("routes.xml", text)));
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "a");
        assert_eq!(symbols[0].kind, SymbolKind::FUNCTION);
        assert_eq!(symbols[0].range.start, Position::new(1, 2));
        assert_eq!(symbols[0].range.end, Position::new(3, 10));

        let children = symbols[0].children.as_deref().unwrap_or_default();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "from timer:t");
        assert_eq!(children[0].kind, SymbolKind::FIELD);
        assert_eq!(children[0].selection_range.start, Position::new(2, 15));
        assert!(children[0].children.is_none());
    }

    #[test]
    fn java_routes() {
        let text = "from(\"timer:a?period=5\").to(\"log:b\");\nfrom(\"direct:c\").to(\"log:d\");";
        let symbols = nested(document_symbols(&doc("R.java", text)));
        let names: Vec<_> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["from timer:a", "from direct:c"]);
        assert_eq!(symbols[1].range.start.line, 1);
    }

    #[test]
    fn unrecognized_documents_have_no_symbols() {
        assert!(document_symbols(&doc("notes.txt", "from timer to log")).is_none());
        assert!(document_symbols(&doc("r.yaml", "- from:\n    uri: timer:a\n")).is_none());
    }
}
