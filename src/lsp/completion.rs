//! Completion for endpoint URIs, Camel-K modelines and `camel.component.*`
//! keys of properties files.
//!
//! The cursor is classified against the instance model into exactly one
//! context, then items are drawn from the catalog. Every item carries a text
//! edit over the token being typed so accepting it never duplicates text.

use tower_lsp::lsp_types::*;

use crate::catalog::{Catalog, ParameterDescriptor, TraitDefinition};
use crate::document::{DocumentSnapshot, LineIndex, TextRange};
use crate::model::{CamelUri, EndpointRole, PathParam, QueryParam, UriElement, UriSite};
use crate::syntax::modeline::{self, Modeline, TraitOption};
use crate::syntax::{properties, Syntax};

/// Where the cursor sits, as far as completion cares.
#[derive(Debug)]
enum CompletionContext<'a, 'c> {
    /// Typing a scheme. `range` covers the scheme typed so far.
    ComponentName { range: TextRange, has_colon: bool },
    PathParam {
        uri: &'a CamelUri<'c>,
        param: &'a PathParam,
    },
    QueryKey {
        uri: &'a CamelUri<'c>,
        param: &'a QueryParam,
        role: Option<EndpointRole>,
    },
    QueryValue {
        uri: &'a CamelUri<'c>,
        param: &'a QueryParam,
    },
    ModelineOption {
        range: TextRange,
        has_value: bool,
    },
    TraitName {
        option: &'a TraitOption,
    },
    TraitOptionKey {
        option: &'a TraitOption,
    },
    TraitOptionValue {
        option: &'a TraitOption,
    },
}

fn classify_uri<'a, 'c>(
    site: &UriSite,
    uri: &'a CamelUri<'c>,
    offset: usize,
) -> Option<CompletionContext<'a, 'c>> {
    let context = match uri.element_at(offset)? {
        UriElement::Component(component) => CompletionContext::ComponentName {
            range: component.range,
            has_colon: true,
        },
        UriElement::PathParam(param) => CompletionContext::PathParam { uri, param },
        UriElement::QueryKey(param) => CompletionContext::QueryKey {
            uri,
            param,
            role: site.role,
        },
        UriElement::QueryValue(param) => CompletionContext::QueryValue { uri, param },
    };
    Some(context)
}

fn classify_modeline(modeline: &Modeline, offset: usize) -> Option<CompletionContext<'_, '_>> {
    if offset < modeline.prefix_end {
        return None;
    }
    let Some(option) = modeline.option_at(offset) else {
        return Some(CompletionContext::ModelineOption {
            range: TextRange::at(offset, 0),
            has_value: false,
        });
    };
    if option.name_range.contains(offset) {
        return Some(CompletionContext::ModelineOption {
            range: option.name_range,
            has_value: option.value.is_some(),
        });
    }
    let t = option.trait_option.as_ref()?;
    if t.trait_range.contains(offset) {
        Some(CompletionContext::TraitName { option: t })
    } else if t.property_range.is_some_and(|r| r.contains(offset)) {
        Some(CompletionContext::TraitOptionKey { option: t })
    } else if t.value_range.is_some_and(|r| r.contains(offset)) {
        Some(CompletionContext::TraitOptionValue { option: t })
    } else {
        None
    }
}

/// Text between the start of `range` and the cursor, lower-cased.
fn typed_prefix(source: &str, range: TextRange, offset: usize) -> String {
    let end = offset.clamp(range.start, range.end);
    source
        .get(range.start..end)
        .unwrap_or_default()
        .to_lowercase()
}

fn matches_prefix(label: &str, prefix: &str) -> bool {
    prefix.is_empty() || label.to_lowercase().starts_with(prefix)
}

/// Builds items that replace one token of the document.
struct ItemBuilder<'a> {
    line_index: &'a LineIndex,
    range: TextRange,
    prefix: String,
    items: Vec<CompletionItem>,
}

impl<'a> ItemBuilder<'a> {
    fn new(line_index: &'a LineIndex, range: TextRange, offset: usize) -> Self {
        let prefix = typed_prefix(line_index.source(), range, offset);
        Self {
            line_index,
            range,
            prefix,
            items: Vec::new(),
        }
    }

    fn push(
        &mut self,
        label: &str,
        kind: CompletionItemKind,
        new_text: String,
        documentation: Option<&str>,
        deprecated: bool,
    ) {
        if !matches_prefix(label, &self.prefix) {
            return;
        }
        let sort_text = format!("{:04}_{}", self.items.len(), label);
        self.items.push(CompletionItem {
            label: label.to_string(),
            kind: Some(kind),
            documentation: documentation
                .filter(|d| !d.is_empty())
                .map(|d| Documentation::String(d.to_string())),
            tags: deprecated.then(|| vec![CompletionItemTag::DEPRECATED]),
            sort_text: Some(sort_text),
            filter_text: Some(label.to_string()),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                range: self.line_index.to_lsp_range(self.range),
                new_text,
            })),
            ..Default::default()
        });
    }

    fn finish(self) -> Vec<CompletionItem> {
        self.items
    }
}

/// `name` or `name=default`, keeping an existing `=value` untouched.
fn option_insert_text(name: &str, default: Option<String>, has_value: bool) -> String {
    match default {
        Some(default) if !has_value => format!("{}={}", name, default),
        _ => name.to_string(),
    }
}

/// Trait properties always get their `=`, followed by the default if any.
fn trait_property_insert_text(name: &str, default: Option<String>, has_value: bool) -> String {
    if has_value {
        return name.to_string();
    }
    format!("{}={}", name, default.unwrap_or_default())
}

/// Schemes available on the active runtime, followed by `separator` when it
/// is not typed yet.
fn component_items(
    catalog: &Catalog,
    line_index: &LineIndex,
    range: TextRange,
    separator: Option<char>,
    offset: usize,
) -> Vec<CompletionItem> {
    let mut builder = ItemBuilder::new(line_index, range, offset);
    for descriptor in catalog.components.iter() {
        if !descriptor.available_on(catalog.runtime) {
            continue;
        }
        let scheme = descriptor.scheme();
        let new_text = match separator {
            Some(separator) => format!("{}{}", scheme, separator),
            None => scheme.to_string(),
        };
        builder.push(
            scheme,
            CompletionItemKind::MODULE,
            new_text,
            Some(&descriptor.component.description),
            descriptor.component.deprecated,
        );
    }
    builder.finish()
}

fn value_items(
    line_index: &LineIndex,
    range: TextRange,
    offset: usize,
    choices: &[String],
) -> Vec<CompletionItem> {
    let mut builder = ItemBuilder::new(line_index, range, offset);
    for choice in choices {
        builder.push(
            choice,
            CompletionItemKind::ENUM_MEMBER,
            choice.clone(),
            None,
            false,
        );
    }
    builder.finish()
}

fn option_value_choices(option: &ParameterDescriptor) -> Vec<String> {
    if !option.enum_values.is_empty() {
        option.enum_values.clone()
    } else if option.is_boolean() {
        vec!["true".to_string(), "false".to_string()]
    } else {
        Vec::new()
    }
}

fn query_key_items(
    line_index: &LineIndex,
    uri: &CamelUri<'_>,
    param: &QueryParam,
    role: Option<EndpointRole>,
    offset: usize,
) -> Vec<CompletionItem> {
    let Some(descriptor) = uri.descriptor() else {
        return Vec::new();
    };
    let mut builder = ItemBuilder::new(line_index, param.key_range, offset);
    for (name, option) in descriptor.options() {
        if !option.applies_to(role) {
            continue;
        }
        let already_set = uri
            .query_params
            .iter()
            .any(|p| p.key == name && !std::ptr::eq(p, param));
        if already_set {
            continue;
        }
        builder.push(
            name,
            CompletionItemKind::PROPERTY,
            option_insert_text(name, option.rendered_default(), param.value.is_some()),
            Some(&option.description),
            option.deprecated,
        );
    }
    builder.finish()
}

fn uri_items(
    catalog: &Catalog,
    line_index: &LineIndex,
    site: &UriSite,
    offset: usize,
) -> Vec<CompletionItem> {
    let Some(uri) = CamelUri::parse(site, &catalog.components) else {
        // No `:` yet, so the whole literal is a scheme being typed.
        return component_items(catalog, line_index, site.range, Some(':'), offset);
    };
    let Some(context) = classify_uri(site, &uri, offset) else {
        return Vec::new();
    };
    match context {
        CompletionContext::ComponentName { range, has_colon } => {
            let separator = (!has_colon).then_some(':');
            component_items(catalog, line_index, range, separator, offset)
        }
        CompletionContext::PathParam { uri, param } => match uri.path_descriptor(param) {
            Some(option) => value_items(line_index, param.range, offset, &option.enum_values),
            None => Vec::new(),
        },
        CompletionContext::QueryKey { uri, param, role } => {
            query_key_items(line_index, uri, param, role, offset)
        }
        CompletionContext::QueryValue { uri, param } => {
            let (Some(option), Some(range)) = (uri.option_descriptor(&param.key), param.value_range)
            else {
                return Vec::new();
            };
            value_items(line_index, range, offset, &option_value_choices(option))
        }
        _ => Vec::new(),
    }
}

fn trait_name_items(
    catalog: &Catalog,
    line_index: &LineIndex,
    option: &TraitOption,
    offset: usize,
) -> Vec<CompletionItem> {
    let mut builder = ItemBuilder::new(line_index, option.trait_range, offset);
    for definition in catalog.traits.iter() {
        let new_text = if option.property.is_some() {
            definition.name.clone()
        } else {
            format!("{}.", definition.name)
        };
        builder.push(
            &definition.name,
            CompletionItemKind::MODULE,
            new_text,
            Some(&definition.description),
            false,
        );
    }
    builder.finish()
}

fn trait_property_items(
    definition: &TraitDefinition,
    line_index: &LineIndex,
    option: &TraitOption,
    range: TextRange,
    offset: usize,
) -> Vec<CompletionItem> {
    let mut builder = ItemBuilder::new(line_index, range, offset);
    for property in &definition.properties {
        builder.push(
            &property.name,
            CompletionItemKind::PROPERTY,
            trait_property_insert_text(
                &property.name,
                property.rendered_default(),
                option.value.is_some(),
            ),
            Some(&property.description),
            false,
        );
    }
    builder.finish()
}

fn modeline_option_items(
    line_index: &LineIndex,
    range: TextRange,
    has_value: bool,
    offset: usize,
) -> Vec<CompletionItem> {
    let mut builder = ItemBuilder::new(line_index, range, offset);
    for (name, description) in modeline::OPTION_NAMES {
        let new_text = if has_value {
            name.to_string()
        } else {
            format!("{}=", name)
        };
        builder.push(
            name,
            CompletionItemKind::KEYWORD,
            new_text,
            Some(description),
            false,
        );
    }
    builder.finish()
}

fn modeline_items(
    catalog: &Catalog,
    line_index: &LineIndex,
    modeline: &Modeline,
    offset: usize,
) -> Vec<CompletionItem> {
    let Some(context) = classify_modeline(modeline, offset) else {
        return Vec::new();
    };
    match context {
        CompletionContext::ModelineOption { range, has_value } => {
            modeline_option_items(line_index, range, has_value, offset)
        }
        CompletionContext::TraitName { option } => {
            trait_name_items(catalog, line_index, option, offset)
        }
        CompletionContext::TraitOptionKey { option } => {
            let (Some(definition), Some(range)) =
                (catalog.traits.get(&option.trait_name), option.property_range)
            else {
                return Vec::new();
            };
            trait_property_items(definition, line_index, option, range, offset)
        }
        CompletionContext::TraitOptionValue { option } => {
            let property = option
                .property
                .as_deref()
                .and_then(|p| catalog.traits.get(&option.trait_name)?.property(p));
            let (Some(property), Some(range)) = (property, option.value_range) else {
                return Vec::new();
            };
            value_items(line_index, range, offset, &property.value_choices())
        }
        _ => Vec::new(),
    }
}

/// `camel.component.<scheme>.<option>=<value>`: schemes, then component-level
/// options, then their values.
fn properties_items(
    catalog: &Catalog,
    doc: &DocumentSnapshot,
    offset: usize,
) -> Vec<CompletionItem> {
    let line_index = &doc.line_index;
    let Some(property) = properties::component_property_on_line(doc, line_index.line_of(offset))
    else {
        return Vec::new();
    };
    if property.scheme_range.contains(offset) {
        let separator = property.name_range.is_none().then_some('.');
        return component_items(catalog, line_index, property.scheme_range, separator, offset);
    }
    let Some(descriptor) = catalog.components.get(&property.scheme) else {
        return Vec::new();
    };

    if let Some(range) = property.name_range.filter(|r| r.contains(offset)) {
        let mut builder = ItemBuilder::new(line_index, range, offset);
        for (name, option) in &descriptor.component_properties {
            builder.push(
                name,
                CompletionItemKind::PROPERTY,
                option_insert_text(name, option.rendered_default(), property.value.is_some()),
                Some(&option.description),
                option.deprecated,
            );
        }
        return builder.finish();
    }
    match (
        property.value_range.filter(|r| r.contains(offset)),
        descriptor.component_properties.get(&property.name),
    ) {
        (Some(range), Some(option)) => {
            value_items(line_index, range, offset, &option_value_choices(option))
        }
        _ => Vec::new(),
    }
}

/// Compute completions at a position.
///
/// A modeline on the cursor line takes precedence over route syntaxes.
pub fn completion_at_position(
    doc: &DocumentSnapshot,
    catalog: &Catalog,
    position: Position,
) -> Option<CompletionResponse> {
    let line_index = &doc.line_index;
    let offset = line_index.position_to_offset(position)?;

    let items = if let Some(modeline) = Modeline::parse(line_index, position.line as usize) {
        modeline_items(catalog, line_index, &modeline, offset)
    } else if properties::is_properties(doc) {
        properties_items(catalog, doc, offset)
    } else {
        let syntax = Syntax::detect(doc)?;
        let site = syntax.endpoint_at(doc, offset)?;
        uri_items(catalog, line_index, &site, offset)
    };

    if items.is_empty() {
        return None;
    }
    Some(CompletionResponse::Array(items))
}
