//! Quick fixes for unknown options and invalid enum values.
//!
//! Each fix replaces the offending token with a known name or value within
//! a small edit distance of what was typed.

use std::collections::HashMap;

use tower_lsp::lsp_types::*;

use crate::catalog::validate::FindingCategory;
use crate::catalog::{Catalog, ParameterDescriptor};
use crate::document::{DocumentSnapshot, TextRange};
use crate::model::{CamelUri, UriElement};
use crate::syntax::{properties, Syntax};

use super::diagnostics::finding_code;

/// Share of the typed length that may differ in a suggestion.
const DISTANCE_RATIO: f32 = 0.4;

/// The token a quick fix rewrites and what may replace it.
struct FixTarget {
    range: TextRange,
    typed: String,
    candidates: Vec<String>,
}

/// Compute Levenshtein distance between two strings
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();
    if a_chars.is_empty() {
        return n;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];
    for (i, a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for j in 1..=n {
            let cost = usize::from(*a_char != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Candidates close enough to `typed`, in catalog order.
fn close_candidates<'a>(typed: &str, candidates: &'a [String]) -> Vec<&'a str> {
    let threshold = (typed.chars().count() as f32 * DISTANCE_RATIO).round() as usize;
    candidates
        .iter()
        .filter(|candidate| candidate.as_str() != typed)
        .filter(|candidate| levenshtein(candidate, typed) <= threshold)
        .map(String::as_str)
        .collect()
}

fn enum_values(option: &ParameterDescriptor) -> Vec<String> {
    option.enum_values.clone()
}

fn uri_target(
    doc: &DocumentSnapshot,
    catalog: &Catalog,
    category: FindingCategory,
    offset: usize,
) -> Option<FixTarget> {
    let syntax = Syntax::detect(doc)?;
    let site = syntax.endpoint_at(doc, offset)?;
    let uri = CamelUri::parse(&site, &catalog.components)?;
    let descriptor = uri.descriptor()?;

    match (category, uri.element_at(offset)?) {
        (FindingCategory::Unknown, UriElement::QueryKey(param)) => Some(FixTarget {
            range: param.key_range,
            typed: param.key.clone(),
            candidates: descriptor
                .options()
                .filter(|(_, option)| option.applies_to(site.role))
                .map(|(name, _)| name.to_string())
                .collect(),
        }),
        (FindingCategory::InvalidEnum, UriElement::QueryKey(param)) => Some(FixTarget {
            range: param.value_range?,
            typed: param.value.clone()?,
            candidates: enum_values(uri.option_descriptor(&param.key)?),
        }),
        (FindingCategory::InvalidEnum, UriElement::PathParam(param)) => Some(FixTarget {
            range: param.range,
            typed: param.value.clone(),
            candidates: enum_values(uri.path_descriptor(param)?),
        }),
        _ => None,
    }
}

fn properties_target(
    doc: &DocumentSnapshot,
    catalog: &Catalog,
    category: FindingCategory,
    offset: usize,
) -> Option<FixTarget> {
    let line = doc.line_index.line_of(offset);
    let property = properties::component_property_on_line(doc, line)?;
    let descriptor = catalog.components.get(&property.scheme)?;
    let name_range = property.name_range?;

    match category {
        FindingCategory::Unknown => Some(FixTarget {
            range: name_range,
            typed: name_range.slice(doc.text())?.to_string(),
            candidates: descriptor.component_properties.keys().cloned().collect(),
        }),
        FindingCategory::InvalidEnum => Some(FixTarget {
            range: property.value_range?,
            typed: property.value?,
            candidates: enum_values(descriptor.component_properties.get(&property.name)?),
        }),
        _ => None,
    }
}

fn diagnostic_category(diagnostic: &Diagnostic) -> Option<FindingCategory> {
    let NumberOrString::String(code) = diagnostic.code.as_ref()? else {
        return None;
    };
    [FindingCategory::Unknown, FindingCategory::InvalidEnum]
        .into_iter()
        .find(|category| code.as_str() == finding_code(*category))
}

fn quick_fix(
    doc: &DocumentSnapshot,
    diagnostic: &Diagnostic,
    range: Range,
    replacement: &str,
) -> CodeActionOrCommand {
    let mut changes = HashMap::new();
    changes.insert(
        doc.uri.clone(),
        vec![TextEdit {
            range,
            new_text: replacement.to_string(),
        }],
    );
    CodeActionOrCommand::CodeAction(CodeAction {
        title: format!("Did you mean {}?", replacement),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Quick fixes for the unknown-option and invalid-enum diagnostics among
/// `diagnostics`, one action per close candidate.
pub fn code_actions(
    doc: &DocumentSnapshot,
    catalog: &Catalog,
    diagnostics: &[Diagnostic],
) -> Vec<CodeActionOrCommand> {
    let mut actions = Vec::new();
    for diagnostic in diagnostics {
        let Some(category) = diagnostic_category(diagnostic) else {
            continue;
        };
        let Some(offset) = doc.line_index.position_to_offset(diagnostic.range.start) else {
            continue;
        };
        let target = if properties::is_properties(doc) {
            properties_target(doc, catalog, category, offset)
        } else {
            uri_target(doc, catalog, category, offset)
        };
        let Some(target) = target else {
            continue;
        };

        let range = doc.line_index.to_lsp_range(target.range);
        for candidate in close_candidates(&target.typed, &target.candidates) {
            actions.push(quick_fix(doc, diagnostic, range, candidate));
        }
    }
    actions
}
