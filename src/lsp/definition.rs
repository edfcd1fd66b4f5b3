//! Go-to-definition from `ref:` endpoints to the element declaring the id.

use tower_lsp::lsp_types::{Location, Position};

use crate::catalog::ComponentCatalog;
use crate::document::DocumentSnapshot;
use crate::model::CamelUri;
use crate::syntax::Syntax;

const REF_COMPONENT: &str = "ref";

/// Resolve the definition of the endpoint under `position`.
///
/// The first declaration in document order whose id equals the first path
/// parameter of a `ref:` URI wins.
pub fn definition_at_position(
    doc: &DocumentSnapshot,
    catalog: &ComponentCatalog,
    position: Position,
) -> Option<Location> {
    let offset = doc.line_index.position_to_offset(position)?;
    let syntax = Syntax::detect(doc)?;
    let site = syntax.endpoint_at(doc, offset)?;
    let uri = CamelUri::parse(&site, catalog)?;
    if uri.component.name != REF_COMPONENT {
        return None;
    }
    let key = &uri.path_params.first()?.value;

    let declaration = syntax
        .declarations(doc)
        .into_iter()
        .find(|declaration| &declaration.id == key)?;
    Some(Location {
        uri: doc.uri.clone(),
        range: doc.line_index.to_lsp_range(declaration.range),
    })
}
