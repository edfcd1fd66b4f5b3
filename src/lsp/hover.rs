//! Hover documentation for URI parts and modeline options.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::catalog::Catalog;
use crate::document::{DocumentSnapshot, LineIndex, TextRange};
use crate::model::{CamelUri, UriElement};
use crate::syntax::modeline::{self, Modeline, OPTION_TRAIT};
use crate::syntax::Syntax;

fn markdown(line_index: &LineIndex, value: String, range: TextRange) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(line_index.to_lsp_range(range)),
    }
}

fn uri_hover(uri: &CamelUri<'_>, offset: usize) -> Option<(String, TextRange)> {
    match uri.element_at(offset)? {
        UriElement::Component(component) => {
            let descriptor = component.descriptor?;
            let info = &descriptor.component;
            let title = info.title.as_deref().unwrap_or(&info.scheme);
            let text = format!(
                "**{}**\n\n{}\n\n```\n{}\n```",
                title, info.description, info.syntax
            );
            Some((text, component.range))
        }
        UriElement::PathParam(param) => {
            let option = uri.path_descriptor(param)?;
            let name = param.name.as_deref().unwrap_or_default();
            Some((format!("`{}`\n\n{}", name, option.description), param.range))
        }
        UriElement::QueryKey(param) => {
            uri.descriptor()?;
            let text = match uri.option_descriptor(&param.key) {
                Some(option) => format!(
                    "`{}` ({})\n\n{}",
                    param.key, option.value_type, option.description
                ),
                None => format!(
                    "The parameter {} is not a known parameter of the component. Check if it is written correctly and is supported by the used Camel version (see pom.xml).",
                    param.key
                ),
            };
            Some((text, param.key_range))
        }
        UriElement::QueryValue(_) => None,
    }
}

fn modeline_hover(
    catalog: &Catalog,
    modeline: &Modeline,
    offset: usize,
) -> Option<(String, TextRange)> {
    let option = modeline.option_at(offset)?;
    if option.name_range.contains(offset) {
        let description = modeline::option_description(&option.name)?;
        return Some((description.to_string(), option.name_range));
    }
    if option.name != OPTION_TRAIT {
        return None;
    }
    let t = option.trait_option.as_ref()?;
    let definition = catalog.traits.get(&t.trait_name)?;
    if t.trait_range.contains(offset) {
        return Some((
            format!("**{}**\n\n{}", definition.name, definition.description),
            t.trait_range,
        ));
    }
    let range = t.property_range.filter(|r| r.contains(offset))?;
    let property = definition.property(t.property.as_deref()?)?;
    let mut text = format!(
        "`{}.{}` ({})\n\n{}",
        definition.name, property.name, property.value_type, property.description
    );
    if let Some(default) = property.rendered_default() {
        text.push_str(&format!("\n\nDefault: `{}`", default));
    }
    Some((text, range))
}

/// Compute hover information at a position.
pub fn hover_at_position(
    doc: &DocumentSnapshot,
    catalog: &Catalog,
    position: Position,
) -> Option<Hover> {
    let line_index = &doc.line_index;
    let offset = line_index.position_to_offset(position)?;

    let (text, range) = match Modeline::parse(line_index, position.line as usize) {
        Some(modeline) => modeline_hover(catalog, &modeline, offset)?,
        None => {
            let site = Syntax::detect(doc)?.endpoint_at(doc, offset)?;
            let uri = CamelUri::parse(&site, &catalog.components)?;
            uri_hover(&uri, offset)?
        }
    };
    Some(markdown(line_index, text, range))
}
