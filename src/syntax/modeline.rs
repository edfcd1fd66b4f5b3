//! Camel-K modelines: `// camel-k: trait=container.port=8080 dependency=...`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::{find_outside_placeholders, split_pieces, LineIndex, TextRange};

static PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?://|#|<!--)[ \t]*camel-k:").unwrap());

/// Closing marker of an XML comment modeline.
const XML_COMMENT_END: &str = "-->";

pub const OPTION_TRAIT: &str = "trait";

/// Option names understood by `kamel run`, with their descriptions.
pub const OPTION_NAMES: &[(&str, &str)] = &[
    ("dependency", "An external library that should be included, e.g. for Maven dependencies \"dependency=mvn:org.my:app:1.0\""),
    ("env", "Set an environment variable in the integration container, e.g. \"env=MY_VAR=my-value\""),
    ("label", "Add a label to the integration, e.g. \"label=my.company=hello\""),
    ("name", "The integration name"),
    ("open-api", "Add an OpenAPI v2 spec (file path)"),
    ("profile", "Trait profile used for deployment"),
    ("property", "Add a runtime property or properties file (syntax: [my-key=my-value|file:/path/to/my-conf.properties])"),
    ("property-file", "Bind a property file to the integration. E.g. \"property-file=integration.properties\""),
    ("resource", "Add a resource"),
    ("trait", "Configure a trait. E.g. \"trait=service.enabled=false\""),
];

pub fn option_description(name: &str) -> Option<&'static str> {
    OPTION_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, description)| *description)
}

/// A parsed modeline on one line of a document.
#[derive(Debug, Clone)]
pub struct Modeline {
    pub line: usize,
    /// End of the `// camel-k:` prefix.
    pub prefix_end: usize,
    pub options: Vec<ModelineOption>,
}

#[derive(Debug, Clone)]
pub struct ModelineOption {
    pub name: String,
    pub name_range: TextRange,
    pub value: Option<String>,
    pub value_range: Option<TextRange>,
    /// Decomposition of `trait=` values.
    pub trait_option: Option<TraitOption>,
}

impl ModelineOption {
    pub fn range(&self) -> TextRange {
        let end = self.value_range.map_or(self.name_range.end, |r| r.end);
        TextRange::new(self.name_range.start, end)
    }
}

/// `<trait>.<property>=<value>` as written after `trait=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitOption {
    pub trait_name: String,
    pub trait_range: TextRange,
    /// `None` until a `.` has been typed.
    pub property: Option<String>,
    pub property_range: Option<TextRange>,
    pub value: Option<String>,
    pub value_range: Option<TextRange>,
}

impl TraitOption {
    fn parse(text: &str, start: usize) -> Self {
        let Some(dot) = text.find('.') else {
            return Self {
                trait_name: text.to_string(),
                trait_range: TextRange::at(start, text.len()),
                property: None,
                property_range: None,
                value: None,
                value_range: None,
            };
        };
        let rest = &text[dot + 1..];
        let rest_start = start + dot + 1;
        let (property, value) = match rest.find('=') {
            Some(eq) => (&rest[..eq], Some((rest_start + eq + 1, &rest[eq + 1..]))),
            None => (rest, None),
        };
        Self {
            trait_name: text[..dot].to_string(),
            trait_range: TextRange::at(start, dot),
            property: Some(property.to_string()),
            property_range: Some(TextRange::at(rest_start, property.len())),
            value: value.map(|(_, v)| v.to_string()),
            value_range: value.map(|(s, v)| TextRange::at(s, v.len())),
        }
    }
}

impl Modeline {
    /// Parse line `line` of a document, if it is a modeline.
    pub fn parse(index: &LineIndex, line: usize) -> Option<Self> {
        let range = index.line_range(line)?;
        let text = range.slice(index.source())?;
        let prefix = PREFIX.find(text)?;
        let prefix_end = range.start + prefix.end();
        let body = &text[prefix.end()..];

        let options = split_pieces(body, prefix_end, |rest| {
            rest.starts_with([' ', '\t']).then_some(1)
        })
        .into_iter()
        .filter(|piece| !piece.text.is_empty() && piece.text != XML_COMMENT_END)
        .map(|piece| {
            let text = piece.text.strip_suffix(XML_COMMENT_END).unwrap_or(piece.text);
            let start = piece.range.start;
            match find_outside_placeholders(text, '=') {
                Some(eq) => {
                    let name = &text[..eq];
                    let value = &text[eq + 1..];
                    let value_start = start + eq + 1;
                    let trait_option = (name == OPTION_TRAIT)
                        .then(|| TraitOption::parse(value, value_start));
                    ModelineOption {
                        name: name.to_string(),
                        name_range: TextRange::at(start, eq),
                        value: Some(value.to_string()),
                        value_range: Some(TextRange::at(value_start, value.len())),
                        trait_option,
                    }
                }
                None => ModelineOption {
                    name: text.to_string(),
                    name_range: TextRange::at(start, text.len()),
                    value: None,
                    value_range: None,
                    trait_option: None,
                },
            }
        })
        .collect();

        Some(Self {
            line,
            prefix_end,
            options,
        })
    }

    /// Every modeline in a document.
    pub fn all(index: &LineIndex) -> Vec<Self> {
        (0..index.line_count())
            .filter_map(|line| Self::parse(index, line))
            .collect()
    }

    pub fn option_at(&self, offset: usize) -> Option<&ModelineOption> {
        self.options.iter().find(|o| o.range().contains(offset))
    }

    /// Trait options that set the same `trait.property` more than once,
    /// every occurrence included, in line order.
    pub fn duplicate_traits(&self) -> Vec<&TraitOption> {
        let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
        let assigned = || {
            self.options
                .iter()
                .filter_map(|o| o.trait_option.as_ref())
                .filter_map(|t| Some((t, t.property.as_deref()?)))
        };
        for (t, property) in assigned() {
            *counts.entry((t.trait_name.as_str(), property)).or_default() += 1;
        }
        assigned()
            .filter(|(t, property)| counts[&(t.trait_name.as_str(), *property)] > 1)
            .map(|(t, _)| t)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Modeline> {
        Modeline::parse(&LineIndex::new(text.to_string()), 0)
    }

    #[test]
    fn recognized_prefixes() {
        assert!(parse("// camel-k: name=a").is_some());
        assert!(parse("# camel-k: name=a").is_some());
        assert!(parse("<!-- camel-k: name=a -->").is_some());
        assert!(parse("  //camel-k: name=a").is_some());
        assert!(parse("// camel k: name=a").is_none());
        assert!(parse("let x = 1; // camel-k: name=a").is_none());
    }

    #[test]
    fn options_with_ranges() {
        let text = "// camel-k: dependency=mvn:org.foo:bar:1.0   name=hello";
        let modeline = parse(text).unwrap();
        assert_eq!(modeline.prefix_end, 11);
        let names: Vec<_> = modeline.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["dependency", "name"]);

        let dependency = &modeline.options[0];
        assert_eq!(dependency.name_range, TextRange::new(12, 22));
        assert_eq!(dependency.value.as_deref(), Some("mvn:org.foo:bar:1.0"));
        assert_eq!(dependency.value_range.unwrap().slice(text), Some("mvn:org.foo:bar:1.0"));
    }

    #[test]
    fn trait_value_is_decomposed() {
        let text = "// camel-k: trait=container.port=8080";
        let modeline = parse(text).unwrap();
        let t = modeline.options[0].trait_option.as_ref().unwrap();
        assert_eq!(t.trait_name, "container");
        assert_eq!(t.trait_range.slice(text), Some("container"));
        assert_eq!(t.property.as_deref(), Some("port"));
        assert_eq!(t.property_range.unwrap().slice(text), Some("port"));
        assert_eq!(t.value.as_deref(), Some("8080"));
        assert_eq!(t.value_range.unwrap().slice(text), Some("8080"));
    }

    #[test]
    fn partial_trait_values() {
        let modeline = parse("// camel-k: trait=cont").unwrap();
        let t = modeline.options[0].trait_option.as_ref().unwrap();
        assert_eq!(t.trait_name, "cont");
        assert!(t.property.is_none());

        let modeline = parse("// camel-k: trait=container.").unwrap();
        let t = modeline.options[0].trait_option.as_ref().unwrap();
        assert_eq!(t.property.as_deref(), Some(""));
        assert!(t.value.is_none());
    }

    #[test]
    fn xml_comment_end_is_ignored() {
        let modeline = parse("<!-- camel-k: name=a -->").unwrap();
        assert_eq!(modeline.options.len(), 1);
        let modeline = parse("<!-- camel-k: name=a-->").unwrap();
        assert_eq!(modeline.options[0].value.as_deref(), Some("a"));
    }

    #[test]
    fn duplicates_are_parsed_and_reported() {
        let text = "// camel-k: trait=service.enabled=true trait=jvm.debug=true trait=service.enabled=false";
        let modeline = parse(text).unwrap();
        assert_eq!(modeline.options.len(), 3);
        let duplicates = modeline.duplicate_traits();
        assert_eq!(duplicates.len(), 2);
        assert!(duplicates.iter().all(|t| t.trait_name == "service"));
    }

    #[test]
    fn option_lookup_by_offset() {
        let text = "// camel-k: name=a trait=x";
        let modeline = parse(text).unwrap();
        assert_eq!(modeline.option_at(13).unwrap().name, "name");
        assert_eq!(modeline.option_at(22).unwrap().name, "trait");
        assert!(modeline.option_at(5).is_none());
    }
}
