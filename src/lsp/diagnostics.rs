//! Diagnostics conversion from validation findings to LSP diagnostics.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, DiagnosticTag, NumberOrString};

use crate::catalog::validate::{
    validate_component_property, validate_uri, FindingCategory, ValidationFinding,
};
use crate::catalog::Catalog;
use crate::document::{DocumentSnapshot, LineIndex, TextRange};
use crate::model::CamelUri;
use crate::syntax::{properties, Modeline, Syntax, TraitOption};

const SOURCE: &str = "camel";
const REFERENCE_SIGIL: char = '#';

fn list(values: &[String]) -> String {
    format!("[{}]", values.join(", "))
}

fn enum_message(finding: &ValidationFinding) -> Option<String> {
    if finding.choices.is_empty() {
        return None;
    }
    let mut message = format!(
        "Invalid enum value: {}. Possible values: {}",
        finding.value,
        list(&finding.choices)
    );
    if !finding.close_choices.is_empty() {
        message.push_str(&format!(". Did you mean: {}", list(&finding.close_choices)));
    }
    if let Some(default) = &finding.default_value {
        message.push_str(&format!(". Default value: {}", default));
    }
    Some(message)
}

fn reference_message(finding: &ValidationFinding) -> String {
    if finding.value.is_empty() {
        format!("Empty reference value for option: {}", finding.property)
    } else if !finding.value.starts_with(REFERENCE_SIGIL) {
        format!(
            "Invalid reference value: {} must start with {}",
            finding.value, REFERENCE_SIGIL
        )
    } else {
        format!("Invalid reference value: {}", finding.value)
    }
}

/// Word a finding. `None` when the finding lacks what its message needs.
pub fn finding_message(finding: &ValidationFinding) -> Option<String> {
    let message = match finding.category {
        FindingCategory::InvalidEnum => return enum_message(finding),
        FindingCategory::InvalidReference => reference_message(finding),
        FindingCategory::InvalidBoolean => {
            format!("Invalid boolean value: {}", finding.value)
        }
        FindingCategory::InvalidInteger => {
            format!("Invalid integer value: {}", finding.value)
        }
        FindingCategory::Unknown => format!("Unknown option: {}", finding.property),
        FindingCategory::Deprecated => format!("Deprecated option: {}", finding.property),
        FindingCategory::Duplicate => format!("Duplicate option: {}", finding.property),
        FindingCategory::Empty => format!("Empty value for option: {}", finding.property),
    };
    Some(message)
}

pub(super) fn finding_code(category: FindingCategory) -> &'static str {
    match category {
        FindingCategory::Unknown => "camel-unknown-property",
        FindingCategory::InvalidEnum => "camel-invalid-enum",
        FindingCategory::InvalidReference => "camel-invalid-reference",
        FindingCategory::InvalidBoolean => "camel-invalid-boolean",
        FindingCategory::InvalidInteger => "camel-invalid-integer",
        FindingCategory::Deprecated => "camel-deprecated",
        FindingCategory::Duplicate => "camel-duplicate",
        FindingCategory::Empty => "camel-empty-value",
    }
}

/// Convert validation findings to LSP diagnostics, one per finding.
pub fn to_diagnostics(findings: &[ValidationFinding], line_index: &LineIndex) -> Vec<Diagnostic> {
    findings
        .iter()
        .filter_map(|finding| {
            let message = finding_message(finding)?;
            let (severity, tags) = match finding.category {
                FindingCategory::Deprecated => (
                    DiagnosticSeverity::WARNING,
                    Some(vec![DiagnosticTag::DEPRECATED]),
                ),
                FindingCategory::Duplicate => (DiagnosticSeverity::WARNING, None),
                _ => (DiagnosticSeverity::ERROR, None),
            };
            Some(Diagnostic {
                range: line_index.to_lsp_range(finding.range),
                severity: Some(severity),
                code: Some(NumberOrString::String(
                    finding_code(finding.category).to_string(),
                )),
                code_description: None,
                source: Some(SOURCE.to_string()),
                message,
                related_information: None,
                tags,
                data: None,
            })
        })
        .collect()
}

fn trait_option_range(option: &TraitOption) -> TextRange {
    let end = option
        .value_range
        .or(option.property_range)
        .map_or(option.trait_range.end, |r| r.end);
    TextRange::new(option.trait_range.start, end)
}

/// Diagnostics for trait properties assigned more than once on a modeline.
pub fn modeline_diagnostics(line_index: &LineIndex) -> Vec<Diagnostic> {
    Modeline::all(line_index)
        .iter()
        .flat_map(|modeline| modeline.duplicate_traits())
        .map(|option| Diagnostic {
            range: line_index.to_lsp_range(trait_option_range(option)),
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::String("camel-duplicate-trait".to_string())),
            code_description: None,
            source: Some(SOURCE.to_string()),
            message: format!(
                "More than one trait defines the same property: {}.{}",
                option.trait_name,
                option.property.as_deref().unwrap_or_default()
            ),
            related_information: None,
            tags: None,
            data: None,
        })
        .collect()
}

/// Findings for `camel.component.*` lines of a properties file.
fn properties_findings(doc: &DocumentSnapshot, catalog: &Catalog) -> Vec<ValidationFinding> {
    properties::component_properties(doc)
        .iter()
        .filter_map(|property| {
            let descriptor = catalog.components.get(&property.scheme)?;
            Some(validate_component_property(
                descriptor,
                &property.name,
                property.value.as_deref()?,
                property.range()?,
            ))
        })
        .flatten()
        .collect()
}

/// Findings for every endpoint URI of a route document.
fn route_findings(doc: &DocumentSnapshot, catalog: &Catalog) -> Vec<ValidationFinding> {
    let Some(syntax) = Syntax::detect(doc) else {
        return Vec::new();
    };
    syntax
        .endpoints(doc)
        .iter()
        .filter_map(|site| CamelUri::parse(site, &catalog.components))
        .flat_map(|uri| validate_uri(&uri))
        .collect()
}

/// Every diagnostic for a document snapshot.
pub fn document_diagnostics(doc: &DocumentSnapshot, catalog: &Catalog) -> Vec<Diagnostic> {
    let mut diagnostics = modeline_diagnostics(&doc.line_index);
    let findings = if properties::is_properties(doc) {
        properties_findings(doc, catalog)
    } else {
        route_findings(doc, catalog)
    };
    diagnostics.extend(to_diagnostics(&findings, &doc.line_index));
    diagnostics
}
