//! Checks endpoint options against their catalog descriptors.
//!
//! Produces categorized findings only; turning them into worded, positioned
//! diagnostics is the job of the diagnostics module.

use std::collections::HashSet;

use crate::document::TextRange;
use crate::model::CamelUri;

use super::{ComponentDescriptor, ParameterDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingCategory {
    Unknown,
    InvalidEnum,
    InvalidReference,
    InvalidBoolean,
    InvalidInteger,
    Deprecated,
    Duplicate,
    Empty,
}

/// One problem with one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFinding {
    pub property: String,
    pub category: FindingCategory,
    /// The offending value as written.
    pub value: String,
    /// Every allowed value, for enum findings.
    pub choices: Vec<String>,
    /// Allowed values that look like what was typed.
    pub close_choices: Vec<String>,
    pub default_value: Option<String>,
    pub range: TextRange,
}

impl ValidationFinding {
    fn new(property: &str, category: FindingCategory, value: &str, range: TextRange) -> Self {
        Self {
            property: property.to_string(),
            category,
            value: value.to_string(),
            choices: Vec::new(),
            close_choices: Vec::new(),
            default_value: None,
            range,
        }
    }
}

/// Values that are resolved at runtime and cannot be checked here.
fn is_dynamic(value: &str) -> bool {
    value.contains("{{") || value.contains("${") || value.starts_with("RAW(")
}

/// Validate every path and query parameter of a URI whose component is known.
pub fn validate_uri(uri: &CamelUri<'_>) -> Vec<ValidationFinding> {
    let Some(descriptor) = uri.descriptor() else {
        return Vec::new();
    };
    let mut findings = Vec::new();

    for param in &uri.path_params {
        let Some(option) = uri.path_descriptor(param) else {
            continue;
        };
        let name = param.name.as_deref().unwrap_or_default();
        if param.value.is_empty() || is_dynamic(&param.value) {
            continue;
        }
        findings.extend(check_value(name, option, &param.value, param.range));
    }

    let mut seen = HashSet::new();
    for param in &uri.query_params {
        if param.key.is_empty() && param.value.is_none() {
            continue;
        }
        let range = param.range();
        if !seen.insert(param.key.as_str()) {
            findings.push(ValidationFinding::new(
                &param.key,
                FindingCategory::Duplicate,
                param.value.as_deref().unwrap_or_default(),
                range,
            ));
            continue;
        }
        let value = param.value.as_deref().unwrap_or_default();
        match descriptor.option(&param.key) {
            Some(option) => findings.extend(check_option(&param.key, option, value, range)),
            None => findings.push(ValidationFinding::new(
                &param.key,
                FindingCategory::Unknown,
                value,
                range,
            )),
        }
    }

    findings
}

/// Validate a component-level property (`camel.component.<scheme>.<name>=<value>`).
pub fn validate_component_property(
    descriptor: &ComponentDescriptor,
    name: &str,
    value: &str,
    range: TextRange,
) -> Vec<ValidationFinding> {
    match descriptor.component_properties.get(name) {
        Some(option) => check_option(name, option, value, range),
        None => vec![ValidationFinding::new(
            name,
            FindingCategory::Unknown,
            value,
            range,
        )],
    }
}

fn check_option(
    name: &str,
    option: &ParameterDescriptor,
    value: &str,
    range: TextRange,
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    if option.deprecated {
        findings.push(ValidationFinding::new(
            name,
            FindingCategory::Deprecated,
            value,
            range,
        ));
    }
    if value.is_empty() {
        let category = if option.is_reference() {
            FindingCategory::InvalidReference
        } else {
            FindingCategory::Empty
        };
        findings.push(ValidationFinding::new(name, category, value, range));
        return findings;
    }
    if !is_dynamic(value) {
        findings.extend(check_value(name, option, value, range));
    }
    findings
}

fn check_value(
    name: &str,
    option: &ParameterDescriptor,
    value: &str,
    range: TextRange,
) -> Option<ValidationFinding> {
    if !option.enum_values.is_empty() {
        if option.enum_values.iter().any(|choice| choice == value) {
            return None;
        }
        let mut finding = ValidationFinding::new(name, FindingCategory::InvalidEnum, value, range);
        finding.close_choices = close_choices(value, &option.enum_values);
        finding.choices = option.enum_values.clone();
        finding.default_value = option.rendered_default();
        return Some(finding);
    }
    let category = if option.is_boolean() {
        (value != "true" && value != "false").then_some(FindingCategory::InvalidBoolean)
    } else if option.is_integer() {
        value
            .parse::<i64>()
            .is_err()
            .then_some(FindingCategory::InvalidInteger)
    } else if option.is_reference() {
        (!value.starts_with('#') || value.len() == 1).then_some(FindingCategory::InvalidReference)
    } else {
        None
    };
    category.map(|category| ValidationFinding::new(name, category, value, range))
}

/// Choices sharing at least a two character (case-insensitive) prefix with
/// `value`, or the whole of a shorter value.
fn close_choices(value: &str, choices: &[String]) -> Vec<String> {
    let value = value.to_lowercase();
    let wanted = value.chars().count().min(2);
    if wanted == 0 {
        return Vec::new();
    }
    choices
        .iter()
        .filter(|choice| {
            let common = choice
                .to_lowercase()
                .chars()
                .zip(value.chars())
                .take_while(|(a, b)| a == b)
                .count();
            common >= wanted
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ComponentCatalog;

    fn findings_for(text: &str) -> Vec<(String, FindingCategory)> {
        let catalog = ComponentCatalog::builtin().unwrap();
        let uri = CamelUri::parse_text(text, 0, "&", &catalog).unwrap();
        validate_uri(&uri)
            .into_iter()
            .map(|f| (f.property, f.category))
            .collect()
    }

    #[test]
    fn valid_uri_has_no_findings() {
        assert!(findings_for("timer:foo?period=1000&fixedRate=true&repeatCount=3").is_empty());
    }

    #[test]
    fn unknown_component_is_not_validated() {
        assert!(findings_for("nope:foo?anything=1").is_empty());
    }

    #[test]
    fn categorizes_each_bad_option() {
        let findings = findings_for(
            "timer:foo?fixedRate=yes&repeatCount=many&unknownKey=1&exchangePattern=InOut&period=",
        );
        assert_eq!(
            findings,
            vec![
                ("fixedRate".to_string(), FindingCategory::InvalidBoolean),
                ("repeatCount".to_string(), FindingCategory::InvalidInteger),
                ("unknownKey".to_string(), FindingCategory::Unknown),
                ("period".to_string(), FindingCategory::Empty),
            ]
        );
    }

    #[test]
    fn second_occurrence_is_a_duplicate() {
        let findings = findings_for("timer:foo?period=1&period=2");
        assert_eq!(findings, vec![("period".to_string(), FindingCategory::Duplicate)]);
    }

    #[test]
    fn invalid_enum_carries_choices() {
        let catalog = ComponentCatalog::builtin().unwrap();
        let uri = CamelUri::parse_text("log:foo?level=INF", 0, "&", &catalog).unwrap();
        let findings = validate_uri(&uri);
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.category, FindingCategory::InvalidEnum);
        assert_eq!(finding.value, "INF");
        assert_eq!(finding.close_choices, vec!["INFO"]);
        assert_eq!(finding.default_value.as_deref(), Some("INFO"));
        assert_eq!(finding.range, TextRange::new(8, 17));
    }

    #[test]
    fn path_enum_is_checked() {
        let findings = findings_for("jms:quue:orders");
        assert_eq!(
            findings,
            vec![("destinationType".to_string(), FindingCategory::InvalidEnum)]
        );
    }

    #[test]
    fn reference_options() {
        assert_eq!(
            findings_for("timer:foo?exceptionHandler=myHandler"),
            vec![("exceptionHandler".to_string(), FindingCategory::InvalidReference)]
        );
        assert!(findings_for("timer:foo?exceptionHandler=#myHandler").is_empty());
        assert_eq!(
            findings_for("timer:foo?exceptionHandler="),
            vec![("exceptionHandler".to_string(), FindingCategory::InvalidReference)]
        );
    }

    #[test]
    fn placeholders_skip_type_checks() {
        assert!(findings_for("timer:foo?period={{my.period}}&fixedRate=${flag}").is_empty());
    }

    #[test]
    fn component_property_validation() {
        let catalog = ComponentCatalog::builtin().unwrap();
        let kafka = catalog.get("kafka").unwrap();
        let range = TextRange::new(0, 4);
        assert!(validate_component_property(kafka, "brokers", "localhost:9092", range).is_empty());
        let findings = validate_component_property(kafka, "autoCommitEnable", "maybe", range);
        assert_eq!(findings[0].category, FindingCategory::InvalidBoolean);
        let findings = validate_component_property(kafka, "topic", "x", range);
        assert_eq!(findings[0].category, FindingCategory::Unknown);
    }
}
