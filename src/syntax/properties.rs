//! `application.properties` style configuration of components.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{DocumentSnapshot, TextRange};

/// Every group may be empty so a line that is still being typed is matched.
static COMPONENT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[ \t]*camel\.component\.(?P<scheme>[a-z0-9-]*)(?:\.(?P<name>[A-Za-z0-9_-]*)(?:[ \t]*[=:][ \t]*(?P<value>.*?))?)?[ \t]*$",
    )
    .unwrap()
});

/// `camel.component.<scheme>.<name>=<value>`, possibly incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentProperty {
    pub scheme: String,
    pub scheme_range: TextRange,
    /// Option name, camelCased. Empty until typed.
    pub name: String,
    /// `None` until the `.` after the scheme is typed.
    pub name_range: Option<TextRange>,
    pub value: Option<String>,
    pub value_range: Option<TextRange>,
}

impl ComponentProperty {
    /// Range of `<name>=<value>`, once both are present.
    pub fn range(&self) -> Option<TextRange> {
        let name = self.name_range?;
        let value = self.value_range?;
        Some(TextRange::new(name.start, value.end))
    }
}

pub fn is_properties(doc: &DocumentSnapshot) -> bool {
    doc.path().ends_with(".properties")
}

/// Kebab-case option names are accepted for camelCase ones.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// The component key written on `line`, if the line is one.
pub fn component_property_on_line(
    doc: &DocumentSnapshot,
    line: usize,
) -> Option<ComponentProperty> {
    let range = doc.line_index.line_range(line)?;
    let caps = COMPONENT_KEY.captures(range.slice(doc.text())?)?;
    let absolute =
        |m: regex::Match| TextRange::new(range.start + m.start(), range.start + m.end());

    let scheme = caps.name("scheme")?;
    let name = caps.name("name");
    let value = caps.name("value");
    Some(ComponentProperty {
        scheme: scheme.as_str().to_string(),
        scheme_range: absolute(scheme),
        name: name.map(|m| camel_case(m.as_str())).unwrap_or_default(),
        name_range: name.map(absolute),
        value: value.map(|m| m.as_str().to_string()),
        value_range: value.map(absolute),
    })
}

/// Complete `scheme.name=value` lines, in document order.
pub fn component_properties(doc: &DocumentSnapshot) -> Vec<ComponentProperty> {
    (0..doc.line_index.line_count())
        .filter_map(|line| component_property_on_line(doc, line))
        .filter(|property| {
            !property.scheme.is_empty() && !property.name.is_empty() && property.value.is_some()
        })
        .collect()
}
