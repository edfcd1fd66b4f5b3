//! References between producers and consumers of in-memory endpoints.
//!
//! `to("direct:x")` and `from("direct:x")` refer to each other. Searching
//! from one side lists the endpoints on the other side, in every open
//! document.

use tower_lsp::lsp_types::{Location, Position};

use crate::catalog::ComponentCatalog;
use crate::document::DocumentSnapshot;
use crate::model::{CamelUri, EndpointRole};
use crate::syntax::Syntax;

/// Components whose first path parameter names a shared in-memory queue.
const REFERENCE_COMPONENTS: &[&str] = &["direct", "direct-vm", "seda", "vm"];

/// Component, key and role of a referencing endpoint.
#[derive(Debug)]
struct ReferenceKey {
    component: String,
    key: String,
    role: EndpointRole,
}

fn reference_key(uri: &CamelUri<'_>, role: Option<EndpointRole>) -> Option<ReferenceKey> {
    let component = uri.component.name.as_str();
    if !REFERENCE_COMPONENTS.contains(&component) {
        return None;
    }
    let key = &uri.path_params.first()?.value;
    if key.is_empty() {
        return None;
    }
    Some(ReferenceKey {
        component: component.to_string(),
        key: key.clone(),
        role: role?,
    })
}

/// Endpoints in `doc` pairing with `wanted`, as locations of their URIs.
fn matching_endpoints(
    doc: &DocumentSnapshot,
    catalog: &ComponentCatalog,
    wanted: &ReferenceKey,
) -> Vec<Location> {
    let Some(syntax) = Syntax::detect(doc) else {
        return Vec::new();
    };
    syntax
        .endpoints(doc)
        .iter()
        .filter(|site| {
            CamelUri::parse(site, catalog)
                .and_then(|uri| reference_key(&uri, site.role))
                .is_some_and(|found| {
                    found.role != wanted.role
                        && found.component == wanted.component
                        && found.key == wanted.key
                })
        })
        .map(|site| Location {
            uri: doc.uri.clone(),
            range: doc.line_index.to_lsp_range(site.range),
        })
        .collect()
}

/// Endpoints on the other side of the `direct`/`seda`/`vm` endpoint under
/// `position`, searched in `documents` in the order given.
pub fn references_at_position<'a>(
    doc: &DocumentSnapshot,
    documents: impl IntoIterator<Item = &'a DocumentSnapshot>,
    catalog: &ComponentCatalog,
    position: Position,
) -> Vec<Location> {
    let Some(offset) = doc.line_index.position_to_offset(position) else {
        return Vec::new();
    };
    let Some(site) = Syntax::detect(doc).and_then(|syntax| syntax.endpoint_at(doc, offset)) else {
        return Vec::new();
    };
    let wanted = CamelUri::parse(&site, catalog).and_then(|uri| reference_key(&uri, site.role));
    let Some(wanted) = wanted else {
        return Vec::new();
    };

    documents
        .into_iter()
        .flat_map(|other| matching_endpoints(other, catalog, &wanted))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Url;

    fn doc(name: &str, text: &str) -> DocumentSnapshot {
        let uri = Url::parse(&format!("file:///ws/{}", name)).unwrap();
        DocumentSnapshot::new(uri, text.to_string(), 0)
    }

    const ROUTES: &str = r#"<routes xmlns="http://camel.apache.org/schema/spring">
  <route>
    <from uri="timer:t"/>
    <to uri="direct:a"/>
  </route>
  <route>
    <from uri="direct:a"/>
    <to uri="direct:b?timeout=5"/>
  </route>
  <route>
    <from uri="direct:b"/>
    <to uri="seda:a"/>
  </route>
</routes>"#;

    fn lines(locations: &[Location]) -> Vec<u32> {
        locations.iter().map(|l| l.range.start.line).collect()
    }

    fn find(
        doc: &DocumentSnapshot,
        others: &[&DocumentSnapshot],
        line: u32,
        character: u32,
    ) -> Vec<Location> {
        let catalog = ComponentCatalog::builtin().unwrap();
        references_at_position(
            doc,
            others.iter().copied(),
            &catalog,
            Position::new(line, character),
        )
    }

    #[test]
    fn producer_finds_consumer() {
        let d = doc("routes.xml", ROUTES);
        let found = find(&d, &[&d], 3, 18);
        assert_eq!(lines(&found), vec![6]);
        assert_eq!(found[0].range.start.character, 15);
        assert_eq!(found[0].range.end.character, 23);
    }

    #[test]
    fn consumer_finds_producers_with_query() {
        let d = doc("routes.xml", ROUTES);
        assert_eq!(lines(&find(&d, &[&d], 10, 18)), vec![7]);
    }

    #[test]
    fn same_key_on_another_component_does_not_match() {
        let d = doc("routes.xml", ROUTES);
        assert!(find(&d, &[&d], 11, 18).is_empty());
    }

    #[test]
    fn non_reference_components_have_no_references() {
        let d = doc("routes.xml", ROUTES);
        assert!(find(&d, &[&d], 2, 18).is_empty());
    }

    #[test]
    fn references_across_documents_and_syntaxes() {
        let xml = doc("routes.xml", ROUTES);
        let java = doc(
            "R.java",
            "from(\"direct:a\").to(\"log:x\");\nfrom(\"timer:t\").to(\"direct:a\");",
        );
        let found = find(&java, &[&xml, &java], 0, 10);
        let uris: Vec<_> = found.iter().map(|l| l.uri.path()).collect();
        assert_eq!(uris, vec!["/ws/routes.xml", "/ws/R.java"]);
        assert_eq!(lines(&found), vec![3, 1]);
    }
}
